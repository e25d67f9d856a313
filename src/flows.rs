//! Token lifecycle management for the client-credentials grant.

mod client_credentials;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, TokenState},
	http::HttpTransport,
};

/// Owns the access token for one set of credentials and refreshes it on demand.
///
/// The manager keeps at most one token. Every [`TokenManager::access_token`] call checks the
/// cached value against the refresh buffer and refetches lazily when it is missing or about
/// to expire; nothing runs in the background. Refreshes are serialized by a single-flight
/// guard so concurrent callers that find a stale token trigger exactly one token request.
pub struct TokenManager {
	credentials: Credentials,
	base_url: Url,
	transport: Arc<dyn HttpTransport>,
	refresh_buffer: Duration,
	current: RwLock<Option<AccessToken>>,
	refresh_guard: AsyncMutex<()>,
}
impl TokenManager {
	/// Window before expiry in which a cached token is treated as stale (5 minutes).
	pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::seconds(300);

	/// Creates a manager that requests tokens from `{base_url}/oauth2/v3/token`.
	pub fn new(
		credentials: Credentials,
		base_url: Url,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self {
			credentials,
			base_url,
			transport,
			refresh_buffer: Self::DEFAULT_REFRESH_BUFFER,
			current: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Overrides the refresh buffer; negative values are treated as zero.
	pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Credentials used for token requests.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Buffer subtracted from the expiry when deciding whether to refresh.
	pub fn refresh_buffer(&self) -> Duration {
		self.refresh_buffer
	}

	/// Returns a copy of the cached token, if any.
	pub fn cached_token(&self) -> Option<AccessToken> {
		self.current.read().clone()
	}

	/// Reports the cache state using the current UTC clock.
	pub fn state(&self) -> TokenState {
		self.state_at(OffsetDateTime::now_utc())
	}

	/// Reports the cache state at `instant`.
	pub fn state_at(&self, instant: OffsetDateTime) -> TokenState {
		match self.current.read().as_ref() {
			Some(token) => token.state_at(instant, self.refresh_buffer),
			None => TokenState::Missing,
		}
	}

	/// Drops the cached token so the next call fetches a new one.
	pub fn clear_token(&self) {
		*self.current.write() = None;
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("client_id", &self.credentials.client_id())
			.field("base_url", &self.base_url.as_str())
			.field("refresh_buffer", &self.refresh_buffer)
			.field("state", &self.state())
			.finish()
	}
}
