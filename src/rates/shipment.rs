//! Package and shipment descriptions, with the checks applied before any pricing call.

// self
use crate::{_prelude::*, error::ValidationError};

/// Physical package: weight in pounds, dimensions in inches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Package {
	/// Weight in pounds.
	pub weight_lbs: f64,
	/// Length in inches.
	pub length: f64,
	/// Width in inches.
	pub width: f64,
	/// Height in inches.
	pub height: f64,
}
impl Package {
	/// Creates a package description.
	pub fn new(weight_lbs: f64, length: f64, width: f64, height: f64) -> Self {
		Self { weight_lbs, length, width, height }
	}

	/// Rejects non-positive weight or dimensions.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if !is_positive(self.weight_lbs) {
			return Err(ValidationError::NonPositiveWeight);
		}
		if ![self.length, self.width, self.height].into_iter().all(is_positive) {
			return Err(ValidationError::NonPositiveDimensions);
		}

		Ok(())
	}
}

/// Shipment between two US ZIP codes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomesticShipment {
	/// Five-digit origin ZIP code.
	pub origin_zip: String,
	/// Five-digit destination ZIP code.
	pub destination_zip: String,
	/// Package being shipped.
	pub package: Package,
}
impl DomesticShipment {
	/// Creates a domestic shipment.
	pub fn new(
		origin_zip: impl Into<String>,
		destination_zip: impl Into<String>,
		package: Package,
	) -> Self {
		Self { origin_zip: origin_zip.into(), destination_zip: destination_zip.into(), package }
	}

	/// Checks ZIP codes, then the package.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if !is_zip(&self.origin_zip) {
			return Err(ValidationError::InvalidOriginZip);
		}
		if !is_zip(&self.destination_zip) {
			return Err(ValidationError::InvalidDestinationZip);
		}

		self.package.validate()
	}
}

/// Shipment from a US ZIP code to a foreign country.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InternationalShipment {
	/// Five-digit origin ZIP code.
	pub origin_zip: String,
	/// ISO 3166-1 alpha-2 destination country code, any case.
	pub destination_country: String,
	/// Foreign postal code, when known.
	#[serde(default)]
	pub destination_postal_code: Option<String>,
	/// Package being shipped.
	pub package: Package,
}
impl InternationalShipment {
	/// Creates an international shipment without a foreign postal code.
	pub fn new(
		origin_zip: impl Into<String>,
		destination_country: impl Into<String>,
		package: Package,
	) -> Self {
		Self {
			origin_zip: origin_zip.into(),
			destination_country: destination_country.into(),
			destination_postal_code: None,
			package,
		}
	}

	/// Sets the foreign postal code.
	pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
		self.destination_postal_code = Some(postal_code.into());

		self
	}

	/// Country code as sent to USPS (upper case).
	pub fn country_code(&self) -> String {
		self.destination_country.to_ascii_uppercase()
	}

	/// Checks the origin ZIP code, the country code, then the package.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if !is_zip(&self.origin_zip) {
			return Err(ValidationError::InvalidOriginZip);
		}
		if !is_country_code(&self.destination_country) {
			return Err(ValidationError::InvalidCountryCode);
		}

		self.package.validate()
	}
}

// NaN is not positive.
fn is_positive(value: f64) -> bool {
	value.is_finite() && value > 0.0
}

fn is_zip(value: &str) -> bool {
	value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

fn is_country_code(value: &str) -> bool {
	value.len() == 2 && value.bytes().all(|b| b.is_ascii_alphabetic())
}
