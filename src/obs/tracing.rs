// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used around token and API calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("usps_rates.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

pub(crate) fn token_requested(client_id_hint: &str) {
	#[cfg(feature = "tracing")]
	tracing::info!(client_id = client_id_hint, "Requesting new OAuth token");
	#[cfg(not(feature = "tracing"))]
	let _ = client_id_hint;
}

pub(crate) fn token_acquired(expires_in: i64) {
	#[cfg(feature = "tracing")]
	tracing::info!(expires_in, "OAuth token acquired successfully");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_in;
}

pub(crate) fn token_failed(status: Option<u16>, message: &str) {
	#[cfg(feature = "tracing")]
	tracing::error!(status_code = ?status, error = message, "OAuth token request failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (status, message);
}

pub(crate) fn api_requested(method: &str, endpoint: &str, mode: &str) {
	#[cfg(feature = "tracing")]
	tracing::info!(method, endpoint, mode, "USPS API request");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, endpoint, mode);
}

pub(crate) fn api_failed(status: u16, endpoint: &str, message: &str) {
	#[cfg(feature = "tracing")]
	tracing::error!(status_code = status, endpoint, error = message, "USPS API error");
	#[cfg(not(feature = "tracing"))]
	let _ = (status, endpoint, message);
}

pub(crate) fn rate_skipped(service: &str, message: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(service, error = message, "USPS service skipped while collecting rates");
	#[cfg(not(feature = "tracing"))]
	let _ = (service, message);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::Api, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn event_helpers_are_side_channel_only() {
		token_requested("client...");
		token_acquired(3600);
		token_failed(Some(401), "Client authentication failed");
		api_requested("POST", "/prices/v3/base-rates/search", "sandbox");
		api_failed(400, "/prices/v3/base-rates/search", "Invalid ZIP code format");
		rate_skipped(
			"USPS_MEDIA_MAIL",
			"No rate found in API response for service: USPS_MEDIA_MAIL",
		);
	}
}
