//! Wire format of the USPS OAuth 2.0 token endpoint.
//!
//! Builds the form-encoded client-credentials request and maps the endpoint's answers
//! (success body, OAuth error body, transport faults) into [`AccessToken`] values or
//! [`Error::Authentication`].

// crates.io
use ::http::{Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials},
	error::TransportError,
	http::{HttpRequest, HttpResponse},
};

/// Path of the token endpoint relative to the API base URL.
pub const TOKEN_PATH: &str = "/oauth2/v3/token";
/// Lifetime assumed when the endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: i64 = 3600;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const DEFAULT_FAILURE_MESSAGE: &str = "Token request failed";
const MISSING_TOKEN_MESSAGE: &str = "No access token in response";

/// Success body returned by the token endpoint.
#[derive(Clone, Debug, Deserialize)]
struct TokenResponseBody {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<JsonValue>,
}

/// Error body returned by the token endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
struct TokenErrorBody {
	#[serde(default)]
	error_description: Option<String>,
}

/// Joins `path` onto the API base URL without introducing a double slash.
pub fn endpoint_url(base_url: &Url, path: &str) -> String {
	format!("{}{path}", base_url.as_str().trim_end_matches('/'))
}

/// Builds the client-credentials token request.
pub fn build_token_request(base_url: &Url, credentials: &Credentials) -> Result<HttpRequest> {
	let body = url::form_urlencoded::Serializer::new(String::new())
		.append_pair("grant_type", "client_credentials")
		.append_pair("client_id", credentials.client_id())
		.append_pair("client_secret", credentials.client_secret().expose())
		.finish();

	::http::Request::builder()
		.method(Method::POST)
		.uri(endpoint_url(base_url, TOKEN_PATH))
		.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
		.body(body.into_bytes())
		.map_err(wrap_fault)
}

/// Maps a token endpoint response into an [`AccessToken`] issued at `issued_at`.
pub fn map_token_response(
	response: HttpResponse,
	issued_at: OffsetDateTime,
) -> Result<AccessToken> {
	let status = response.status().as_u16();

	if status != 200 {
		let message = serde_json::from_slice::<TokenErrorBody>(response.body())
			.ok()
			.and_then(|body| body.error_description)
			.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.into());

		return Err(Error::authentication(message, Some(status)));
	}

	let deserializer = &mut serde_json::Deserializer::from_slice(response.body());
	let body: TokenResponseBody =
		serde_path_to_error::deserialize(deserializer).map_err(wrap_fault)?;
	let secret = body
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or_else(|| Error::authentication(MISSING_TOKEN_MESSAGE, None))?;
	let expires_in = parse_expires_in(body.expires_in.as_ref());
	let mut token =
		AccessToken::new(secret, issued_at, Duration::seconds(expires_in)).ok_or_else(|| {
			Error::authentication("Token endpoint returned an out-of-range expires_in.", None)
		})?;

	if let Some(token_type) = body.token_type {
		token = token.with_token_type(token_type);
	}

	Ok(token)
}

/// Wraps a transport fault raised while calling the token endpoint.
pub fn map_transport_fault(err: TransportError) -> Error {
	wrap_fault(err)
}

fn wrap_fault(err: impl 'static + Send + Sync + StdError) -> Error {
	Error::authentication_caused_by(format!("Failed to acquire access token: {err}"), err)
}

// Numeric strings are accepted; anything unreadable falls back to the default lifetime.
fn parse_expires_in(value: Option<&JsonValue>) -> i64 {
	match value {
		Some(JsonValue::Number(number)) => number
			.as_i64()
			.or_else(|| number.as_f64().map(|secs| secs as i64))
			.unwrap_or(DEFAULT_EXPIRES_IN),
		Some(JsonValue::String(raw)) => raw.trim().parse().unwrap_or(DEFAULT_EXPIRES_IN),
		_ => DEFAULT_EXPIRES_IN,
	}
}
