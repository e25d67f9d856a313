//! Transport primitives shared by the token manager and the API client.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack: it sends one
//! [`HttpRequest`] and hands back the raw [`HttpResponse`] (status, headers, body) or a
//! [`TransportError`]. Transports never retry and keep no state between calls; status
//! codes are interpreted by the layers above.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Outgoing request handed to a transport.
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Raw response returned by a transport.
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing a single request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by the
/// token manager and the API client behind an `Arc`. Any transport-level fault (DNS, TLS,
/// timeout, connection reset) must surface as [`TransportError`]; non-2xx answers are
/// successful sends.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the raw response.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Fixed timeouts applied by the default transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportConfig {
	/// Total request timeout.
	pub timeout: StdDuration,
	/// Connection establishment timeout.
	pub connect_timeout: StdDuration,
}
impl TransportConfig {
	const DEFAULT_CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(10);
	const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(15);

	/// Overrides the total request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the connect timeout.
	pub fn with_connect_timeout(mut self, timeout: StdDuration) -> Self {
		self.connect_timeout = timeout;

		self
	}
}
impl Default for TransportConfig {
	fn default() -> Self {
		Self { timeout: Self::DEFAULT_TIMEOUT, connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Certificate verification always stays on; the wrapper never exposes the reqwest knobs
/// that disable it. Redirects are not followed, so token and pricing endpoints answer
/// directly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with the provided timeouts.
	pub fn new(config: TransportConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(config.timeout)
			.connect_timeout(config.connect_timeout)
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}

	/// Builds a transport with the default 15s/10s timeouts.
	pub fn with_defaults() -> Result<Self, ConfigError> {
		Self::new(TransportConfig::default())
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
