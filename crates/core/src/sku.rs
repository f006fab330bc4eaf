//! Stock keeping unit value object.
//!
//! SKUs arrive from spreadsheets (as text or numbers), from the keyboard and from
//! barcode scanners. All of them are reduced to one normalized string form so a
//! numeric cell `1001` and a typed `"1001"` compare equal.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Largest float that still round-trips exactly through `i64`.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Normalized SKU.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl ValueObject for Sku {}

impl Sku {
    /// Parse free text (typed or scanned). Surrounding whitespace is dropped.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// SKU from an integer cell.
    pub fn from_int(value: i64) -> Self {
        Self(value.to_string())
    }

    /// SKU from a float cell. Integral values lose their fractional part
    /// (`1001.0` becomes `"1001"`).
    pub fn from_float(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation(format!(
                "SKU cannot be a non-finite number ({value})"
            )));
        }
        if value.fract() == 0.0 && value.abs() < MAX_EXACT_FLOAT {
            return Ok(Self::from_int(value as i64));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Sku {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Sku {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Sku> for String {
    fn from(value: Sku) -> Self {
        value.0
    }
}

impl From<i64> for Sku {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_text_forms_compare_equal() {
        assert_eq!(Sku::from_int(1001), Sku::parse("1001").unwrap());
        assert_eq!(Sku::from(1001), Sku::parse(" 1001\n").unwrap());
    }

    #[test]
    fn integral_float_drops_fraction() {
        assert_eq!(Sku::from_float(1001.0).unwrap().as_str(), "1001");
        assert_eq!(Sku::from_float(-3.0).unwrap().as_str(), "-3");
    }

    #[test]
    fn fractional_float_keeps_decimal_form() {
        assert_eq!(Sku::from_float(12.5).unwrap().as_str(), "12.5");
    }

    #[test]
    fn non_finite_float_is_rejected() {
        assert!(matches!(Sku::from_float(f64::NAN), Err(DomainError::Validation(_))));
        assert!(matches!(
            Sku::from_float(f64::INFINITY),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn blank_sku_is_rejected() {
        assert!(matches!(Sku::parse("   "), Err(DomainError::Validation(_))));
        assert!(Sku::try_from(String::new()).is_err());
    }

    #[test]
    fn serde_goes_through_normalization() {
        let sku: Sku = serde_json::from_str("\"  A-7 \"").unwrap();
        assert_eq!(sku.as_str(), "A-7");
        assert_eq!(serde_json::to_string(&sku).unwrap(), "\"A-7\"");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: an integer SKU matches its text rendering, whatever the padding.
            #[test]
            fn int_matches_padded_text(n in any::<i64>(), pad in "[ \t]{0,3}") {
                let text = format!("{pad}{n}{pad}");
                prop_assert_eq!(Sku::from_int(n), Sku::parse(&text).unwrap());
            }

            /// Property: integral floats normalize to the same SKU as the integer.
            #[test]
            fn integral_float_matches_int(n in -1_000_000_000i64..1_000_000_000) {
                prop_assert_eq!(Sku::from_float(n as f64).unwrap(), Sku::from_int(n));
            }
        }
    }
}
