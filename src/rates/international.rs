//! International base-rate lookups (`/international-prices/v3/base-rates/search`).

// self
use crate::{
	_prelude::*,
	client::Client,
	obs,
	rates::{
		self, InternationalService, InternationalShipment, MailClass, PriceAdjustment,
		PricingFields, Rate,
	},
};

/// Pricing search endpoint for international parcels.
pub const INTERNATIONAL_RATES_PATH: &str = "/international-prices/v3/base-rates/search";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InternationalSearch<'a> {
	#[serde(rename = "originZIPCode")]
	origin_zip_code: &'a str,
	foreign_postal_code: &'a str,
	destination_country_code: String,
	#[serde(flatten)]
	pricing: PricingFields<'a>,
}

/// Quotes USPS international services for an [`InternationalShipment`].
#[derive(Clone, Debug)]
pub struct InternationalRates {
	client: Client,
	adjustment: PriceAdjustment,
}
impl InternationalRates {
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

	/// Quotes one service. The country code is upper-cased on the wire and a missing foreign
	/// postal code is sent as an empty string.
	pub async fn rate(
		&self,
		shipment: &InternationalShipment,
		service: impl Into<MailClass>,
	) -> Result<Rate> {
		shipment.validate()?;

		let mail_class = service.into();
		let body = InternationalSearch {
			origin_zip_code: &shipment.origin_zip,
			foreign_postal_code: shipment.destination_postal_code.as_deref().unwrap_or_default(),
			destination_country_code: shipment.country_code(),
			pricing: PricingFields::new(&shipment.package, &mail_class),
		};

		rates::quote(
			&self.client,
			INTERNATIONAL_RATES_PATH,
			&body,
			mail_class.clone(),
			self.adjustment,
		)
		.await
	}

	/// Quotes every [`InternationalService`], keyed by service code.
	///
	/// Only services without a usable price are left out. API errors abort the lookup, since
	/// they usually mean the destination itself was rejected.
	pub async fn all_rates(
		&self,
		shipment: &InternationalShipment,
	) -> Result<BTreeMap<String, Rate>> {
		shipment.validate()?;

		let mut quotes = BTreeMap::new();

		for &service in InternationalService::ALL {
			match self.rate(shipment, service).await {
				Ok(rate) => {
					quotes.insert(service.code().to_owned(), rate);
				},
				Err(e @ Error::Rate { .. }) => obs::rate_skipped(service.code(), &e.to_string()),
				Err(e) => return Err(e),
			}
		}

		Ok(quotes)
	}
}
