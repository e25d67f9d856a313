//! Domestic base-rate lookups (`/prices/v3/base-rates/search`).

// self
use crate::{
	_prelude::*,
	client::Client,
	obs,
	rates::{
		self, DomesticService, DomesticShipment, MailClass, PriceAdjustment, PricingFields, Rate,
	},
};

/// Pricing search endpoint for domestic parcels.
pub const DOMESTIC_RATES_PATH: &str = "/prices/v3/base-rates/search";

#[derive(Debug, Serialize)]
struct DomesticSearch<'a> {
	#[serde(rename = "originZIPCode")]
	origin_zip_code: &'a str,
	#[serde(rename = "destinationZIPCode")]
	destination_zip_code: &'a str,
	#[serde(flatten)]
	pricing: PricingFields<'a>,
}

/// Quotes USPS domestic services for a [`DomesticShipment`].
#[derive(Clone, Debug)]
pub struct DomesticRates {
	client: Client,
	adjustment: PriceAdjustment,
}
impl DomesticRates {
	/// Creates a calculator that prices with `client` and no adjustment.
	pub fn new(client: Client) -> Self {
		Self { client, adjustment: PriceAdjustment::default() }
	}

	/// Sets the percentage markup (positive) or discount (negative).
	pub fn with_rate_adjustment(mut self, percent: f64) -> Self {
		self.adjustment = self.adjustment.with_rate_adjustment(percent);

		self
	}

	/// Sets the flat handling fee; negative fees are clamped to zero.
	pub fn with_handling_fee(mut self, fee: f64) -> Self {
		self.adjustment = self.adjustment.with_handling_fee(fee);

		self
	}

	/// Adjustment applied to every quote.
	pub fn adjustment(&self) -> PriceAdjustment {
		self.adjustment
	}

	/// Client used for pricing calls.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Quotes one service.
	///
	/// The shipment is validated before any network call.
	pub async fn rate(
		&self,
		shipment: &DomesticShipment,
		service: impl Into<MailClass>,
	) -> Result<Rate> {
		shipment.validate()?;

		let mail_class = service.into();
		let body = DomesticSearch {
			origin_zip_code: &shipment.origin_zip,
			destination_zip_code: &shipment.destination_zip,
			pricing: PricingFields::new(&shipment.package, &mail_class),
		};

		rates::quote(&self.client, DOMESTIC_RATES_PATH, &body, mail_class.clone(), self.adjustment)
			.await
	}

	/// Quotes every [`DomesticService`], keyed by service code.
	///
	/// Services the API cannot price (rate or API errors) are left out; validation,
	/// authentication, and transport failures abort the whole lookup.
	pub async fn all_rates(&self, shipment: &DomesticShipment) -> Result<BTreeMap<String, Rate>> {
		shipment.validate()?;

		let mut quotes = BTreeMap::new();

		for &service in DomesticService::ALL {
			match self.rate(shipment, service).await {
				Ok(rate) => {
					quotes.insert(service.code().to_owned(), rate);
				},
				Err(e @ (Error::Rate { .. } | Error::Api { .. })) =>
					obs::rate_skipped(service.code(), &e.to_string()),
				Err(e) => return Err(e),
			}
		}

		Ok(quotes)
	}
}
