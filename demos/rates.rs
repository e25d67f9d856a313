//! Quotes every domestic USPS service against a local mock of the pricing API, applying a
//! markup and handling fee on top of the quoted base prices.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use usps_rates::{
	auth::Credentials,
	client::Client,
	oauth::TOKEN_PATH,
	rates::{DOMESTIC_RATES_PATH, DomesticRates, DomesticShipment, Package},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let _pricing_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DOMESTIC_RATES_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"totalBasePrice\":9.35}");
		})
		.await;
	let client = Client::builder(Credentials::new("demo-client", "super-secret"))
		.sandbox(true)
		.base_url(Url::parse(&server.url("/"))?)
		.build()?;
	let status = client.test_connection().await;

	println!("{} ({}).", status.message, status.mode);

	let calculator = DomesticRates::new(client).with_rate_adjustment(15.0).with_handling_fee(1.5);
	let shipment = DomesticShipment::new("90210", "10001", Package::new(2.0, 10.0, 8.0, 6.0));

	for (code, rate) in calculator.all_rates(&shipment).await? {
		println!("{code:<30} ${}", rate.formatted_price(2));
	}

	token_mock.assert_calls_async(1).await;

	Ok(())
}
