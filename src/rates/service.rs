//! USPS mail classes understood by the rate calculators.

// self
use crate::_prelude::*;

/// Errors raised while parsing service codes.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown USPS service code: {code}.")]
pub struct UnknownServiceError {
	/// Offending code.
	pub code: String,
}

macro_rules! def_services {
	(
		$(#[$meta:meta])*
		$name:ident {
			$($(#[$vmeta:meta])* $variant:ident => $code:literal, $label:literal;)+
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		pub enum $name {
			$(
				$(#[$vmeta])*
				#[serde(rename = $code)]
				$variant,
			)+
		}
		impl $name {
			/// Every service, in catalog order.
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			/// USPS `mailClass` code.
			pub const fn code(self) -> &'static str {
				match self {
					$(Self::$variant => $code),+
				}
			}

			/// Human-readable service name.
			pub const fn label(self) -> &'static str {
				match self {
					$(Self::$variant => $label),+
				}
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(self.code())
			}
		}
		impl FromStr for $name {
			type Err = UnknownServiceError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::ALL
					.iter()
					.copied()
					.find(|service| service.code() == s)
					.ok_or_else(|| UnknownServiceError { code: s.to_owned() })
			}
		}
		impl From<$name> for MailClass {
			fn from(service: $name) -> Self {
				Self::new(service.code(), service.label())
			}
		}
	};
}

def_services! {
	/// Domestic (US) mail classes.
	DomesticService {
		/// USPS Ground Advantage.
		GroundAdvantage => "USPS_GROUND_ADVANTAGE", "USPS Ground Advantage";
		/// Priority Mail.
		PriorityMail => "PRIORITY_MAIL", "USPS Priority Mail";
		/// Priority Mail Express.
		PriorityMailExpress => "PRIORITY_MAIL_EXPRESS", "USPS Priority Mail Express";
		/// Media Mail.
		MediaMail => "USPS_MEDIA_MAIL", "USPS Media Mail";
		/// First-Class Package Service.
		FirstClassPackage => "FIRST-CLASS_PACKAGE_SERVICE", "USPS First-Class Package";
	}
}

def_services! {
	/// International mail classes.
	InternationalService {
		/// Priority Mail International.
		PriorityMailInternational => "PRIORITY_MAIL_INTERNATIONAL", "Priority Mail International";
		/// Priority Mail Express International.
		PriorityMailExpressInternational =>
			"PRIORITY_MAIL_EXPRESS_INTERNATIONAL", "Priority Mail Express International";
		/// First-Class Package International Service.
		FirstClassPackageInternational =>
			"FIRST-CLASS_PACKAGE_INTERNATIONAL_SERVICE", "First-Class Package International";
	}
}

/// Mail class sent to the pricing API, with the label reported on the resulting rate.
///
/// Raw codes outside the catalogs are accepted as-is and labeled with the code itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailClass {
	code: String,
	label: String,
}
impl MailClass {
	/// Creates a mail class from a code and label.
	pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
		Self { code: code.into(), label: label.into() }
	}

	/// USPS `mailClass` code.
	pub fn code(&self) -> &str {
		&self.code
	}

	/// Human-readable label.
	pub fn label(&self) -> &str {
		&self.label
	}
}
impl From<&str> for MailClass {
	fn from(code: &str) -> Self {
		Self::new(code, code)
	}
}
impl From<String> for MailClass {
	fn from(code: String) -> Self {
		Self { label: code.clone(), code }
	}
}
