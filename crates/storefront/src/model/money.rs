//! Currency codes and minor-unit conversion for the payment widget.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// ISO 4217 codes the storefront can charge in. All of them have two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Inr => "INR",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
        }
    }

    /// Decimal places between the standard and the minor unit.
    pub fn minor_unit_exponent(&self) -> u32 {
        2
    }

    /// Converts a standard-unit amount to minor units, rounding half away from zero.
    ///
    /// Returns `None` if the result doesn't fit an `i64`.
    pub fn to_minor_units(&self, amount: Decimal) -> Option<i64> {
        let exponent = self.minor_unit_exponent();
        amount
            .round_dp_with_strategy(exponent, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::from(10_i64.pow(exponent)))?
            .to_i64()
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported currency: {0}")]
pub struct UnsupportedCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(CurrencyCode::Inr),
            "USD" => Ok(CurrencyCode::Usd),
            "EUR" => Ok(CurrencyCode::Eur),
            "GBP" => Ok(CurrencyCode::Gbp),
            _ => Err(UnsupportedCurrency(s.to_string())),
        }
    }
}
