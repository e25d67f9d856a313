//! Authenticated JSON client for the USPS APIs.
//!
//! [`Client`] composes a [`TokenManager`] with an [`HttpTransport`]: every call obtains a
//! bearer token (refreshing it when needed), sends one JSON request, and normalizes the
//! answer into either a decoded JSON object or an [`Error`]. The client itself holds no
//! mutable state; all of it lives in the token manager.

// crates.io
use ::http::{
	Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
	error::ConfigError,
	flows::TokenManager,
	http::{HttpRequest, HttpTransport, TransportConfig},
	oauth,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Decoded JSON object returned by [`Client::request`].
pub type JsonObject = JsonMap<String, JsonValue>;

/// Environment variable selecting the sandbox (`"false"` selects production).
pub const SANDBOX_ENV: &str = "USPS_SANDBOX";

const JSON_CONTENT_TYPE: &str = "application/json";
const DEFAULT_API_ERROR: &str = "API request failed";
const CONNECTED_MESSAGE: &str = "Successfully connected to USPS API";

/// USPS deployment targeted by a client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// Live pricing (`https://apis.usps.com`).
	#[default]
	Production,
	/// Customer acceptance testing (`https://api-cat.usps.com`).
	Sandbox,
}
impl Environment {
	/// Maps the boolean sandbox flag onto an environment.
	pub const fn from_sandbox(sandbox: bool) -> Self {
		if sandbox { Self::Sandbox } else { Self::Production }
	}

	/// Fixed base URL of the environment.
	pub const fn base_url(self) -> &'static str {
		match self {
			Self::Production => "https://apis.usps.com",
			Self::Sandbox => "https://api-cat.usps.com",
		}
	}

	/// Returns a stable label (`production` / `sandbox`).
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Production => "production",
			Self::Sandbox => "sandbox",
		}
	}

	/// Returns `true` for [`Environment::Sandbox`].
	pub const fn is_sandbox(self) -> bool {
		matches!(self, Self::Sandbox)
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of [`Client::test_connection`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
	/// Whether a token could be obtained.
	pub success: bool,
	/// Success banner or the authentication failure message.
	pub message: String,
	/// Environment the client talks to.
	pub mode: Environment,
}

/// Authenticated USPS API client.
///
/// Cloning is cheap and clones share the same token cache.
#[derive(Clone)]
pub struct Client {
	environment: Environment,
	base_url: Url,
	transport: Arc<dyn HttpTransport>,
	token_manager: Arc<TokenManager>,
}
impl Client {
	/// Starts configuring a client for the provided credentials.
	pub fn builder(credentials: Credentials) -> ClientBuilder {
		ClientBuilder::new(credentials)
	}

	/// Creates a client backed by the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
		sandbox: bool,
	) -> Result<Self> {
		Self::builder(Credentials::new(client_id, client_secret)).sandbox(sandbox).build()
	}

	/// Performs an authenticated `POST` with a JSON body.
	pub async fn post<B>(&self, endpoint: &str, body: &B) -> Result<JsonObject>
	where
		B: ?Sized + Serialize + Sync,
	{
		self.request(endpoint, body, Method::POST).await
	}

	/// Performs one authenticated JSON request against `{base_url}{endpoint}`.
	///
	/// Bodies that serialize to `null`, `{}`, or `[]` are not sent. Non-200 answers fail with
	/// [`Error::Api`] carrying the status and the `error.message` reported by the API.
	pub async fn request<B>(&self, endpoint: &str, body: &B, method: Method) -> Result<JsonObject>
	where
		B: ?Sized + Serialize + Sync,
	{
		const KIND: CallKind = CallKind::Api;

		let span = CallSpan::new(KIND, "request");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.token_manager.access_token().await?;
				let request = self.build_request(endpoint, body, method, &token)?;
				let response = self.transport.send(request).await?;
				let status = response.status().as_u16();

				if status != 200 {
					let message = extract_api_error(response.body());

					obs::api_failed(status, endpoint, &message);

					return Err(Error::api(message, Some(status)));
				}

				serde_json::from_slice::<JsonObject>(response.body())
					.map_err(|e| Error::api(format!("Invalid JSON response: {e}"), None))
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Probes the token endpoint without ever returning an error.
	pub async fn test_connection(&self) -> ConnectionStatus {
		let (success, message) = match self.token_manager.access_token().await {
			Ok(_) => (true, CONNECTED_MESSAGE.to_owned()),
			Err(e) => (false, e.to_string()),
		};

		ConnectionStatus { success, message, mode: self.environment }
	}

	/// Base URL requests are sent to.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Environment selected at construction.
	pub fn environment(&self) -> Environment {
		self.environment
	}

	/// Returns `true` when the client targets the sandbox.
	pub fn is_sandbox(&self) -> bool {
		self.environment.is_sandbox()
	}

	/// Token manager shared by this client and its clones.
	pub fn token_manager(&self) -> &TokenManager {
		&self.token_manager
	}

	/// Drops the cached token so the next request fetches a new one.
	pub fn clear_token(&self) {
		self.token_manager.clear_token();
	}

	fn build_request<B>(
		&self,
		endpoint: &str,
		body: &B,
		method: Method,
		token: &Secret,
	) -> Result<HttpRequest>
	where
		B: ?Sized + Serialize,
	{
		let payload = encode_body(body)?;

		obs::api_requested(method.as_str(), endpoint, self.environment.as_str());

		::http::Request::builder()
			.method(method)
			.uri(oauth::endpoint_url(&self.base_url, endpoint))
			.header(AUTHORIZATION, format!("Bearer {}", token.expose()))
			.header(CONTENT_TYPE, JSON_CONTENT_TYPE)
			.body(payload.unwrap_or_default())
			.map_err(|e| ConfigError::from(e).into())
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("environment", &self.environment)
			.field("base_url", &self.base_url.as_str())
			.field("token_manager", &self.token_manager)
			.finish()
	}
}

/// Builder for [`Client`].
pub struct ClientBuilder {
	credentials: Credentials,
	environment: Environment,
	base_url: Option<Url>,
	transport: Option<Arc<dyn HttpTransport>>,
	transport_config: TransportConfig,
	refresh_buffer: Duration,
}
impl ClientBuilder {
	fn new(credentials: Credentials) -> Self {
		Self {
			credentials,
			environment: Environment::Production,
			base_url: None,
			transport: None,
			transport_config: TransportConfig::default(),
			refresh_buffer: TokenManager::DEFAULT_REFRESH_BUFFER,
		}
	}

	/// Reads credentials and the sandbox flag from `USPS_CLIENT_ID`, `USPS_CLIENT_SECRET`,
	/// and `USPS_SANDBOX`.
	///
	/// The sandbox is selected unless `USPS_SANDBOX` is exactly `false`.
	pub fn from_env() -> Result<Self, ConfigError> {
		let sandbox = std::env::var(SANDBOX_ENV).map(|value| value != "false").unwrap_or(true);

		Ok(Self::new(Credentials::from_env()?).sandbox(sandbox))
	}

	/// Selects the sandbox (`true`) or production (`false`) environment.
	pub fn sandbox(mut self, sandbox: bool) -> Self {
		self.environment = Environment::from_sandbox(sandbox);

		self
	}

	/// Points requests at a different host (staging proxies, local mocks).
	///
	/// The reported [`Environment`] still follows [`ClientBuilder::sandbox`].
	pub fn base_url(mut self, base_url: Url) -> Self {
		self.base_url = Some(base_url);

		self
	}

	/// Uses a caller-provided transport instead of the default reqwest one.
	pub fn transport(mut self, transport: impl HttpTransport) -> Self {
		self.transport = Some(Arc::new(transport));

		self
	}

	/// Uses a shared transport instance.
	pub fn shared_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Overrides the timeouts of the default transport.
	pub fn transport_config(mut self, config: TransportConfig) -> Self {
		self.transport_config = config;

		self
	}

	/// Overrides the token refresh buffer (defaults to 5 minutes).
	pub fn refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = buffer;

		self
	}

	/// Builds the client.
	pub fn build(self) -> Result<Client> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(self.environment.base_url())
				.map_err(|source| ConfigError::InvalidBaseUrl { source })?,
		};
		let transport = match self.transport {
			Some(transport) => transport,
			None => default_transport(self.transport_config)?,
		};
		let token_manager =
			TokenManager::new(self.credentials, base_url.clone(), Arc::clone(&transport))
				.with_refresh_buffer(self.refresh_buffer);

		Ok(Client {
			environment: self.environment,
			base_url,
			transport,
			token_manager: Arc::new(token_manager),
		})
	}
}
impl Debug for ClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientBuilder")
			.field("credentials", &self.credentials)
			.field("environment", &self.environment)
			.field("base_url", &self.base_url.as_ref().map(Url::as_str))
			.field("transport_set", &self.transport.is_some())
			.field("transport_config", &self.transport_config)
			.field("refresh_buffer", &self.refresh_buffer)
			.finish()
	}
}

#[cfg(feature = "reqwest")]
fn default_transport(config: TransportConfig) -> Result<Arc<dyn HttpTransport>> {
	Ok(Arc::new(ReqwestTransport::new(config)?))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport(config: TransportConfig) -> Result<Arc<dyn HttpTransport>> {
	let _ = config;

	Err(ConfigError::MissingTransport.into())
}

// Empty payloads are sent without a body.
fn encode_body<B>(body: &B) -> Result<Option<Vec<u8>>>
where
	B: ?Sized + Serialize,
{
	let value = serde_json::to_value(body)
		.map_err(|e| Error::api(format!("Failed to encode request body: {e}"), None))?;
	let empty = match &value {
		JsonValue::Null => true,
		JsonValue::Object(map) => map.is_empty(),
		JsonValue::Array(items) => items.is_empty(),
		_ => false,
	};

	if empty {
		return Ok(None);
	}

	serde_json::to_vec(&value)
		.map(Some)
		.map_err(|e| Error::api(format!("Failed to encode request body: {e}"), None))
}

fn extract_api_error(body: &[u8]) -> String {
	serde_json::from_slice::<JsonValue>(body)
		.ok()
		.and_then(|value| value.pointer("/error/message")?.as_str().map(str::to_owned))
		.unwrap_or_else(|| DEFAULT_API_ERROR.to_owned())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::BTreeMap as Map;
	// crates.io
	use serde::ser::Error as _;
	use serde_json::json;
	// self
	use super::*;
	use crate::_preludet::{recording_client, *};

	const TOKEN_GRANT: &str = r#"{"access_token":"test-token","expires_in":3600}"#;

	struct Unencodable;
	impl Serialize for Unencodable {
		fn serialize<S>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error>
		where
			S: serde::Serializer,
		{
			Err(S::Error::custom("boom"))
		}
	}

	#[test]
	fn environments_select_fixed_base_urls() {
		let credentials = Credentials::new("id", "secret");
		let sandbox = Client::builder(credentials.clone())
			.sandbox(true)
			.transport(RecordingTransport::default())
			.build()
			.expect("Sandbox client should build.");
		let production = Client::builder(credentials)
			.transport(RecordingTransport::default())
			.build()
			.expect("Production client should build.");

		assert_eq!(sandbox.base_url().as_str(), "https://api-cat.usps.com/");
		assert!(sandbox.is_sandbox());
		assert_eq!(production.base_url().as_str(), "https://apis.usps.com/");
		assert_eq!(production.environment(), Environment::Production);
	}

	#[tokio::test]
	async fn end_to_end_get_returns_decoded_object() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply_json(
			oauth::TOKEN_PATH,
			200,
			json!({ "access_token": "abc", "expires_in": 3600 }),
		);
		transport.reply("/x", 200, r#"{"ok":true}"#);

		let data =
			client.request("/x", &json!({}), Method::GET).await.expect("Request should succeed.");

		assert_eq!(JsonValue::Object(data), json!({ "ok": true }));
		assert_eq!(transport.count(oauth::TOKEN_PATH), 1);
		assert_eq!(transport.count("/x"), 1);
		assert_eq!(transport.requests().len(), 2);

		let resource = transport.last_request().expect("Resource request should be recorded.");

		assert_eq!(resource.method, Method::GET);
		assert_eq!(resource.url, "https://api-cat.usps.com/x");
		assert!(resource.body.is_empty());
	}

	#[tokio::test]
	async fn request_sends_bearer_token_and_json_body() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);
		transport.reply("/prices/v3/base-rates/search", 200, r#"{"totalBasePrice":8.5}"#);

		let mut body = Map::new();

		body.insert("originZIPCode", "90210");

		let data = client
			.post("/prices/v3/base-rates/search", &body)
			.await
			.expect("Pricing request should succeed.");
		let token = client.token_manager().access_token().await.expect("Token should be cached.");
		let request = transport.last_request().expect("Pricing request should be recorded.");

		assert_eq!(data.get("totalBasePrice"), Some(&json!(8.5)));
		assert_eq!(request.method, Method::POST);
		assert_eq!(
			request.header("authorization"),
			Some(format!("Bearer {}", token.expose()).as_str())
		);
		assert_eq!(request.header("content-type"), Some("application/json"));
		assert_eq!(request.body_text(), r#"{"originZIPCode":"90210"}"#);
		assert_eq!(transport.count(oauth::TOKEN_PATH), 1);
	}

	#[tokio::test]
	async fn api_error_message_is_extracted() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);
		transport.reply("/prices", 400, r#"{"error":{"message":"Invalid ZIP code format"}}"#);

		let err = client
			.post("/prices/v3/base-rates/search", &json!({ "originZIPCode": "123" }))
			.await
			.expect_err("400 should fail.");

		assert!(matches!(err, Error::Api { status: Some(400), .. }));
		assert_eq!(err.to_string(), "Invalid ZIP code format");
	}

	#[tokio::test]
	async fn api_error_without_message_uses_default() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);
		transport.reply("/prices", 500, "Internal Server Error");

		let err = client.post("/prices", &json!({ "a": 1 })).await.expect_err("500 should fail.");

		assert_eq!(err.to_string(), DEFAULT_API_ERROR);
		assert_eq!(err.status(), Some(500));
	}

	#[tokio::test]
	async fn invalid_json_on_success_is_an_api_error() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);
		transport.reply("/prices", 200, "<html>");

		let err = client.post("/prices", &json!({ "a": 1 })).await.expect_err("HTML should fail.");

		assert!(matches!(err, Error::Api { .. }));
		assert!(err.to_string().starts_with("Invalid JSON response"));
	}

	#[tokio::test]
	async fn encode_failure_skips_the_network() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);

		let err = client.post("/prices", &Unencodable).await.expect_err("Encoding should fail.");

		assert!(matches!(err, Error::Api { status: None, .. }));
		assert!(err.to_string().starts_with("Failed to encode request body"));
		assert_eq!(transport.count("/prices"), 0);
	}

	#[tokio::test]
	async fn authentication_errors_propagate_unchanged() {
		let (client, transport) = recording_client("bad", "creds");

		transport.reply(
			oauth::TOKEN_PATH,
			401,
			r#"{"error_description":"Client authentication failed"}"#,
		);

		let err = client.post("/prices", &json!({ "a": 1 })).await.expect_err("401 should fail.");

		assert!(matches!(err, Error::Authentication { status: Some(401), .. }));
		assert_eq!(transport.count("/prices"), 0);
	}

	#[tokio::test]
	async fn transport_faults_surface_as_http_errors() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);
		transport.fail("/prices", "tls handshake failed");

		let err = client.post("/prices", &json!({ "a": 1 })).await.expect_err("Fault should fail.");

		assert!(matches!(err, Error::Http(_)));
	}

	#[tokio::test]
	async fn test_connection_reports_instead_of_failing() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(
			oauth::TOKEN_PATH,
			401,
			r#"{"error_description":"Client authentication failed"}"#,
		);

		let status = client.test_connection().await;

		assert_eq!(
			status,
			ConnectionStatus {
				success: false,
				message: "Client authentication failed".into(),
				mode: Environment::Sandbox,
			}
		);

		transport.reset();
		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);

		let status = client.test_connection().await;

		assert!(status.success);
		assert_eq!(status.message, CONNECTED_MESSAGE);
	}

	#[tokio::test]
	async fn clear_token_on_client_forces_refetch() {
		let (client, transport) = recording_client("id", "secret");

		transport.reply(oauth::TOKEN_PATH, 200, TOKEN_GRANT);
		transport.reply("/x", 200, "{}");

		client.request("/x", &(), Method::GET).await.expect("First request should succeed.");
		client.clear_token();
		client.request("/x", &(), Method::GET).await.expect("Second request should succeed.");

		assert_eq!(transport.count(oauth::TOKEN_PATH), 2);
	}

	#[test]
	fn empty_bodies_are_not_encoded() {
		assert_eq!(encode_body(&json!({})).expect("Empty object should encode."), None);
		assert_eq!(encode_body(&()).expect("Unit should encode."), None);
		assert_eq!(
			encode_body(&json!({ "a": 1 })).expect("Object should encode."),
			Some(br#"{"a":1}"#.to_vec())
		);
	}
}
