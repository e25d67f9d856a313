//! Crate-level error types shared by the token manager, API client, and rate calculators.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used to preserve underlying causes.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token request failed (bad credentials, non-200 response, missing token, or a wrapped
	/// transport fault).
	#[error("{message}")]
	Authentication {
		/// Provider- or client-supplied message.
		message: String,
		/// HTTP status code, when the token endpoint answered.
		status: Option<u16>,
		/// Underlying cause, if the failure was not an HTTP answer.
		#[source]
		source: Option<BoxError>,
	},
	/// Authenticated resource call failed or returned an unreadable body.
	#[error("{message}")]
	Api {
		/// Message extracted from the response or describing the local failure.
		message: String,
		/// HTTP status code, when the resource endpoint answered.
		status: Option<u16>,
	},
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Http(#[from] TransportError),
	/// Caller input rejected before any network call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Successful API response lacked an expected price field.
	#[error("{message}")]
	Rate {
		/// Human-readable description of the missing data.
		message: String,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns the HTTP status attached to the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Authentication { status, .. } | Self::Api { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns `true` for token acquisition failures.
	pub fn is_authentication(&self) -> bool {
		matches!(self, Self::Authentication { .. })
	}

	pub(crate) fn authentication(message: impl Into<String>, status: Option<u16>) -> Self {
		Self::Authentication { message: message.into(), status, source: None }
	}

	pub(crate) fn authentication_caused_by(
		message: impl Into<String>,
		source: impl Into<BoxError>,
	) -> Self {
		Self::Authentication { message: message.into(), status: None, source: Some(source.into()) }
	}

	pub(crate) fn api(message: impl Into<String>, status: Option<u16>) -> Self {
		Self::Api { message: message.into(), status }
	}
}

/// Configuration and construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// No transport was supplied and the default transport is disabled.
	#[error("No HTTP transport configured; enable the `reqwest` feature or supply one.")]
	MissingTransport,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the USPS API: {source}.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the USPS API: {0}.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Caller input rejected by the rate calculators.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Origin ZIP is not five digits.
	#[error("Invalid origin ZIP code. Must be 5 digits.")]
	InvalidOriginZip,
	/// Destination ZIP is not five digits.
	#[error("Invalid destination ZIP code. Must be 5 digits.")]
	InvalidDestinationZip,
	/// Destination country is not a two-letter code.
	#[error("Invalid destination country code. Must be 2 letters (ISO 3166-1 alpha-2).")]
	InvalidCountryCode,
	/// Weight is zero, negative, or not a number.
	#[error("Weight must be greater than 0.")]
	NonPositiveWeight,
	/// At least one dimension is zero, negative, or not a number.
	#[error("Dimensions must be greater than 0.")]
	NonPositiveDimensions,
}
