#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use usps_rates::{
	auth::{Credentials, TokenState},
	client::{Client, Environment},
	error::Error,
	http::{ReqwestTransport, TransportConfig},
	oauth::TOKEN_PATH,
};

const CLIENT_ID: &str = "test-client-id";
const CLIENT_SECRET: &str = "test-client-secret";

fn build_client(server: &MockServer) -> Client {
	Client::builder(Credentials::new(CLIENT_ID, CLIENT_SECRET))
		.sandbox(true)
		.base_url(Url::parse(&server.url("/")).expect("Mock server URL should parse successfully."))
		.build()
		.expect("Client should build against the mock server.")
}

#[tokio::test]
async fn token_is_fetched_once_and_sent_as_bearer() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"test-token-abc123\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let pricing_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/prices/v3/base-rates/search")
				.header("authorization", "Bearer test-token-abc123")
				.header("content-type", "application/json")
				.json_body(json!({ "originZIPCode": "90210" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "totalBasePrice": 8.5 }));
		})
		.await;
	let client = build_client(&server);

	for _ in 0..3 {
		let data = client
			.post("/prices/v3/base-rates/search", &json!({ "originZIPCode": "90210" }))
			.await
			.expect("Pricing request should succeed.");

		assert_eq!(data.get("totalBasePrice"), Some(&json!(8.5)));
	}

	token_mock.assert_calls_async(1).await;
	pricing_mock.assert_calls_async(3).await;

	assert_eq!(client.token_manager().state(), TokenState::Valid);
}

#[tokio::test]
async fn short_lived_tokens_are_refreshed_on_next_call() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"short\",\"expires_in\":1}");
		})
		.await;
	let client = build_client(&server);

	client.token_manager().access_token().await.expect("First token request should succeed.");
	client.token_manager().access_token().await.expect("Refresh should succeed.");

	token_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn api_errors_carry_status_and_message() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body("{\"access_token\":\"t\",\"expires_in\":3600}");
		})
		.await;
	let _pricing_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/prices/v3/base-rates/search");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":{\"message\":\"Invalid ZIP code format\"}}");
		})
		.await;
	let err = build_client(&server)
		.post("/prices/v3/base-rates/search", &json!({ "originZIPCode": "123" }))
		.await
		.expect_err("400 should surface as an API error.");

	assert!(matches!(err, Error::Api { status: Some(400), .. }));
	assert_eq!(err.to_string(), "Invalid ZIP code format");
}

#[tokio::test]
async fn invalid_credentials_fail_authentication() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_client\",\"error_description\":\"Client authentication failed\"}",
			);
		})
		.await;
	let client = build_client(&server);
	let err = client
		.post("/prices/v3/base-rates/search", &json!({ "originZIPCode": "90210" }))
		.await
		.expect_err("401 should fail the request.");

	assert!(matches!(err, Error::Authentication { status: Some(401), .. }));
	assert_eq!(err.to_string(), "Client authentication failed");

	let status = client.test_connection().await;

	assert!(!status.success);
	assert_eq!(status.message, "Client authentication failed");
	assert_eq!(status.mode, Environment::Sandbox);

	token_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_requests_share_one_token_request() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"guard-token\",\"expires_in\":900}");
		})
		.await;
	let client = build_client(&server);
	let (first, second, third) = tokio::join!(
		client.test_connection(),
		client.test_connection(),
		client.test_connection(),
	);

	assert!(first.success && second.success && third.success);

	token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_token_endpoint_fails_authentication() {
	let client = Client::builder(Credentials::new(CLIENT_ID, CLIENT_SECRET))
		.base_url(Url::parse("http://127.0.0.1:9").expect("Loopback URL should parse."))
		.transport(
			ReqwestTransport::new(
				TransportConfig::default().with_connect_timeout(std::time::Duration::from_secs(1)),
			)
			.expect("Transport should build."),
		)
		.build()
		.expect("Client should build.");
	let err = client.token_manager().access_token().await.expect_err("Closed port should fail.");

	assert!(err.is_authentication());
	assert!(err.to_string().starts_with("Failed to acquire access token:"));
	assert!(std::error::Error::source(&err).is_some());
}
