//! Domestic and international rate calculators built on [`Client::request`].
//!
//! Calculators validate caller input before any network call, post a pricing search to the
//! USPS Prices API v3, and turn the quoted `totalBasePrice` into a [`Rate`] after applying the
//! configured [`PriceAdjustment`].

pub mod adjustment;
pub mod domestic;
pub mod international;
pub mod rate;
pub mod service;
pub mod shipment;

pub use adjustment::*;
pub use domestic::*;
pub use international::*;
pub use rate::*;
pub use service::*;
pub use shipment::*;

// self
use crate::{
	_prelude::*,
	client::{Client, JsonObject},
};

const PROCESSING_CATEGORY: &str = "NON_MACHINABLE";
const RATE_INDICATOR: &str = "SP";
const DESTINATION_ENTRY_FACILITY: &str = "NONE";
const PRICE_TYPE: &str = "COMMERCIAL";

/// Pricing fields shared by domestic and international searches.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PricingFields<'a> {
	weight: f64,
	length: f64,
	width: f64,
	height: f64,
	mail_class: &'a str,
	processing_category: &'static str,
	rate_indicator: &'static str,
	destination_entry_facility_type: &'static str,
	price_type: &'static str,
}
impl<'a> PricingFields<'a> {
	fn new(package: &Package, mail_class: &'a MailClass) -> Self {
		Self {
			weight: package.weight_lbs,
			length: package.length,
			width: package.width,
			height: package.height,
			mail_class: mail_class.code(),
			processing_category: PROCESSING_CATEGORY,
			rate_indicator: RATE_INDICATOR,
			destination_entry_facility_type: DESTINATION_ENTRY_FACILITY,
			price_type: PRICE_TYPE,
		}
	}
}

// Posts one pricing search and prices the answer.
async fn quote<B>(
	client: &Client,
	endpoint: &str,
	body: &B,
	mail_class: MailClass,
	adjustment: PriceAdjustment,
) -> Result<Rate>
where
	B: Serialize + Sync,
{
	let response = client.post(endpoint, body).await?;

	price_response(response, mail_class, adjustment)
}

fn price_response(
	response: JsonObject,
	mail_class: MailClass,
	adjustment: PriceAdjustment,
) -> Result<Rate> {
	let base_price = response
		.get("totalBasePrice")
		.and_then(read_price)
		.filter(|price| *price != 0.0)
		.ok_or_else(|| Error::Rate {
			message: format!("No rate found in API response for service: {}", mail_class.code()),
		})?;

	Ok(Rate::priced(mail_class, base_price, adjustment, response))
}

fn read_price(value: &JsonValue) -> Option<f64> {
	let price = match value {
		JsonValue::Number(number) => number.as_f64(),
		JsonValue::String(raw) => raw.trim().parse::<f64>().ok(),
		_ => None,
	};

	price.filter(|price| price.is_finite())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn object(value: JsonValue) -> JsonObject {
		match value {
			JsonValue::Object(map) => map,
			_ => panic!("Fixture must be a JSON object."),
		}
	}

	#[test]
	fn missing_zero_or_garbage_prices_are_rate_errors() {
		let bodies = [
			json!({}),
			json!({ "totalBasePrice": 0 }),
			json!({ "totalBasePrice": "n/a" }),
			json!({ "totalBasePrice": null }),
		];

		for body in bodies {
			let err = price_response(
				object(body),
				DomesticService::PriorityMail.into(),
				PriceAdjustment::default(),
			)
			.expect_err("Unpriced response should fail.");

			assert_eq!(err.to_string(), "No rate found in API response for service: PRIORITY_MAIL");
		}
	}

	#[test]
	fn numeric_strings_are_accepted_as_prices() {
		let rate = price_response(
			object(json!({ "totalBasePrice": "12.40" })),
			MailClass::from("CUSTOM_CLASS"),
			PriceAdjustment::default(),
		)
		.expect("Numeric string should price.");

		assert_eq!(rate.base_price, 12.40);
		assert_eq!(rate.service_label, "CUSTOM_CLASS");
	}
}
