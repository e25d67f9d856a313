//! Markup, discount, and flat handling fees applied on top of USPS base prices.

// self
use crate::_prelude::*;

/// Percentage adjustment plus a flat handling fee.
///
/// `total = base * (1 + percent / 100) + handling_fee`. Positive percentages mark the price up,
/// negative ones discount it. The handling fee never goes below zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustment {
	percent: f64,
	handling_fee: f64,
}
impl PriceAdjustment {
	/// Creates an adjustment from a percentage and a handling fee.
	pub fn new(percent: f64, handling_fee: f64) -> Self {
		Self::default().with_rate_adjustment(percent).with_handling_fee(handling_fee)
	}

	/// Sets the percentage adjustment (`20.0` is a 20% markup, `-10.0` a 10% discount).
	pub fn with_rate_adjustment(mut self, percent: f64) -> Self {
		self.percent = percent;

		self
	}

	/// Sets the flat handling fee; negative fees are clamped to zero.
	pub fn with_handling_fee(mut self, fee: f64) -> Self {
		self.handling_fee = fee.max(0.0);

		self
	}

	/// Percentage adjustment.
	pub fn percent(&self) -> f64 {
		self.percent
	}

	/// Flat handling fee.
	pub fn handling_fee(&self) -> f64 {
		self.handling_fee
	}

	/// Applies the adjustment to a base price.
	pub fn apply(&self, base_price: f64) -> f64 {
		base_price * (1.0 + self.percent / 100.0) + self.handling_fee
	}
}
