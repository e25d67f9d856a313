//! Priced quote returned by the calculators.

// self
use crate::{
	_prelude::*,
	client::JsonObject,
	rates::{MailClass, PriceAdjustment},
};

/// Adjustment inputs and raw API answer behind a [`Rate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RateMetadata {
	/// Percentage adjustment applied to the base price.
	pub rate_adjustment_percent: f64,
	/// Flat handling fee added after the percentage.
	pub handling_fee: f64,
	/// Full pricing response as returned by USPS.
	pub api_response: JsonObject,
}

/// One priced shipping option.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rate {
	/// USPS `mailClass` code.
	pub service: String,
	/// Human-readable service name.
	pub service_label: String,
	/// `totalBasePrice` quoted by USPS.
	pub base_price: f64,
	/// Base price after the configured adjustment.
	pub total_price: f64,
	/// Adjustment inputs and raw response.
	pub metadata: RateMetadata,
}
impl Rate {
	pub(crate) fn priced(
		mail_class: MailClass,
		base_price: f64,
		adjustment: PriceAdjustment,
		api_response: JsonObject,
	) -> Self {
		Self {
			service: mail_class.code().to_owned(),
			service_label: mail_class.label().to_owned(),
			base_price,
			total_price: adjustment.apply(base_price),
			metadata: RateMetadata {
				rate_adjustment_percent: adjustment.percent(),
				handling_fee: adjustment.handling_fee(),
				api_response,
			},
		}
	}

	/// Formats the total with `decimals` fraction digits and comma-grouped thousands
	/// (`1,234.50`). No currency symbol is added.
	pub fn formatted_price(&self, decimals: usize) -> String {
		group_thousands(&format!("{:.*}", decimals, self.total_price))
	}
}
impl Display for Rate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}: ${}", self.service_label, self.formatted_price(2))
	}
}

// Inserts `,` every three digits of the integer part of an already rounded number.
fn group_thousands(rounded: &str) -> String {
	let (sign, unsigned) = match rounded.strip_prefix('-') {
		Some(rest) => ("-", rest),
		None => ("", rounded),
	};
	let (integer, fraction) = match unsigned.split_once('.') {
		Some((integer, fraction)) => (integer, Some(fraction)),
		None => (unsigned, None),
	};
	let mut grouped = String::with_capacity(rounded.len() + integer.len() / 3);

	grouped.push_str(sign);

	for (i, digit) in integer.chars().enumerate() {
		if i > 0 && (integer.len() - i) % 3 == 0 {
			grouped.push(',');
		}

		grouped.push(digit);
	}

	if let Some(fraction) = fraction {
		grouped.push('.');
		grouped.push_str(fraction);
	}

	grouped
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::rates::DomesticService;

	#[test]
	fn priced_rate_records_adjustment_inputs() {
		let rate = Rate::priced(
			DomesticService::PriorityMail.into(),
			10.0,
			PriceAdjustment::new(20.0, 1.5),
			JsonObject::new(),
		);

		assert_eq!(rate.service, "PRIORITY_MAIL");
		assert_eq!(rate.service_label, "USPS Priority Mail");
		assert_eq!(rate.formatted_price(2), "13.50");
		assert_eq!(rate.metadata.rate_adjustment_percent, 20.0);
		assert_eq!(rate.metadata.handling_fee, 1.5);
		assert_eq!(rate.to_string(), "USPS Priority Mail: $13.50");
	}

	#[test]
	fn formatted_price_honors_precision() {
		let rate = Rate::priced(
			MailClass::from("X"),
			8.456,
			PriceAdjustment::default(),
			JsonObject::new(),
		);

		assert_eq!(rate.formatted_price(0), "8");
		assert_eq!(rate.formatted_price(3), "8.456");
	}

	#[test]
	fn formatted_price_groups_thousands() {
		let price = |total| {
			Rate::priced(
				MailClass::from("X"),
				total,
				PriceAdjustment::default(),
				JsonObject::new(),
			)
		};

		assert_eq!(price(1234.5).formatted_price(2), "1,234.50");
		assert_eq!(price(999.999).formatted_price(2), "1,000.00");
		assert_eq!(price(1234567.0).formatted_price(0), "1,234,567");
		assert_eq!(price(100.0).formatted_price(2), "100.00");
		assert_eq!(price(1234.5).to_string(), "X: $1,234.50");
	}

	#[test]
	fn negative_totals_keep_the_sign_outside_the_groups() {
		assert_eq!(group_thousands("-1234.50"), "-1,234.50");
		assert_eq!(group_thousands("-123.00"), "-123.00");
	}
}
