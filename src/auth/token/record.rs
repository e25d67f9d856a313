//! Immutable access-token record and its freshness states.

// self
use crate::{_prelude::*, auth::Secret};

/// Lifecycle state of the token cache at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenState {
	/// No token has been fetched yet, or the cache was cleared.
	Missing,
	/// Cached token can be handed out without I/O.
	Valid,
	/// Cached token is inside the refresh buffer (or already expired) and will be refetched.
	Expiring,
}
impl TokenState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenState::Missing => "missing",
			TokenState::Valid => "valid",
			TokenState::Expiring => "expiring",
		}
	}
}
impl Display for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Access token issued by the token endpoint.
///
/// Records are never edited in place; a refresh replaces the whole value so the secret and
/// its expiry always travel together.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer secret; callers must avoid logging it.
	pub secret: Secret,
	/// `token_type` reported by the endpoint, if any.
	pub token_type: Option<String>,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry derived from `issued_at + expires_in`.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a record expiring `expires_in` after `issued_at`.
	///
	/// Returns `None` when the expiry cannot be represented.
	pub fn new(
		secret: impl Into<Secret>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Option<Self> {
		let expires_at = issued_at.checked_add(expires_in)?;

		Some(Self { secret: secret.into(), token_type: None, issued_at, expires_at })
	}

	/// Attaches the reported token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Returns `true` if the token may be used at `instant` with `buffer` to spare.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, buffer: Duration) -> bool {
		match self.expires_at.checked_sub(buffer) {
			Some(deadline) => instant < deadline,
			None => false,
		}
	}

	/// Computes the cache state at `instant`.
	pub fn state_at(&self, instant: OffsetDateTime, buffer: Duration) -> TokenState {
		if self.is_fresh_at(instant, buffer) { TokenState::Valid } else { TokenState::Expiring }
	}

	/// Time left before the hard expiry, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
