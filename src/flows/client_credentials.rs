//! Client-credentials token acquisition with lazy refresh + singleflight guard.
//!
//! [`TokenManager::access_token`] hands out the cached token while it is fresh. Once the
//! token is missing or inside the refresh buffer, callers queue on the manager's guard; the
//! first one through performs the token request and the rest re-check the cache and reuse
//! its result instead of stampeding the token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Secret},
	flows::TokenManager,
	oauth,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

impl TokenManager {
	/// Returns a token valid for immediate use, fetching a new one when needed.
	///
	/// Fails only with [`Error::Authentication`]; transport faults during the token request
	/// are wrapped with their cause preserved.
	pub async fn access_token(&self) -> Result<Secret> {
		const KIND: CallKind = CallKind::Token;

		if let Some(secret) = self.fresh_secret(OffsetDateTime::now_utc()) {
			obs::record_call_outcome(KIND, CallOutcome::Reused);

			return Ok(secret);
		}

		let span = CallSpan::new(KIND, "access_token");

		span.instrument(async move {
			let _singleflight = self.refresh_guard.lock().await;

			// Another caller may have refreshed while this one waited on the guard.
			if let Some(secret) = self.fresh_secret(OffsetDateTime::now_utc()) {
				obs::record_call_outcome(KIND, CallOutcome::Reused);

				return Ok(secret);
			}

			obs::record_call_outcome(KIND, CallOutcome::Attempt);

			let result = self.fetch_token().await;

			match &result {
				Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
				Err(e) => {
					obs::token_failed(e.status(), &e.to_string());
					obs::record_call_outcome(KIND, CallOutcome::Failure);
				},
			}

			let token = result?;
			let secret = token.secret.clone();

			*self.current.write() = Some(token);

			Ok(secret)
		})
		.await
	}

	fn fresh_secret(&self, now: OffsetDateTime) -> Option<Secret> {
		self.current
			.read()
			.as_ref()
			.filter(|token| token.is_fresh_at(now, self.refresh_buffer))
			.map(|token| token.secret.clone())
	}

	async fn fetch_token(&self) -> Result<AccessToken> {
		obs::token_requested(&self.credentials.client_id_hint());

		let request = oauth::build_token_request(&self.base_url, &self.credentials)?;
		let response = self.transport.send(request).await.map_err(oauth::map_transport_fault)?;
		let token = oauth::map_token_response(response, OffsetDateTime::now_utc())?;

		obs::token_acquired(token.remaining_at(token.issued_at).whole_seconds());

		Ok(token)
	}
}
