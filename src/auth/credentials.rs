//! OAuth client credentials used by the client-credentials grant.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Environment variable holding the USPS client identifier.
pub const CLIENT_ID_ENV: &str = "USPS_CLIENT_ID";
/// Environment variable holding the USPS client secret.
pub const CLIENT_SECRET_ENV: &str = "USPS_CLIENT_SECRET";

/// Client identifier + secret pair, fixed for the lifetime of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	client_id: String,
	client_secret: Secret,
}
impl Credentials {
	/// Creates credentials from the provided identifier and secret.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Reads `USPS_CLIENT_ID` and `USPS_CLIENT_SECRET` from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Ok(Self::new(read_env(CLIENT_ID_ENV)?, read_env(CLIENT_SECRET_ENV)?))
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// OAuth client secret.
	pub fn client_secret(&self) -> &Secret {
		&self.client_secret
	}

	/// Shortened identifier safe to attach to log lines.
	pub fn client_id_hint(&self) -> String {
		let prefix = self.client_id.chars().take(10).collect::<String>();

		format!("{prefix}...")
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}

pub(crate) fn read_env(name: &'static str) -> Result<String, ConfigError> {
	std::env::var(name)
		.ok()
		.filter(|value| !value.is_empty())
		.ok_or(ConfigError::MissingEnv { name })
}
