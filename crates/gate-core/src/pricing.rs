//! # Invoice Pricing
//!
//! Single-tier pricing for gate invoices. Every charge is created for the
//! same configured amount (0.01 USD unless overridden).

use crate::error::{GateError, GateResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fiat currencies accepted by the processor (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CAD" => Ok(Currency::CAD),
            "AUD" => Ok(Currency::AUD),
            "CHF" => Ok(Currency::CHF),
            other => Err(GateError::Configuration(format!(
                "Unsupported currency: {}",
                other
            ))),
        }
    }
}

/// Invoice price with amount in smallest currency unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Parse a decimal amount such as `"0.01"`. The amount must be positive.
    pub fn parse(amount: &str, currency: Currency) -> GateResult<Self> {
        let value: f64 = amount.trim().parse().map_err(|_| {
            GateError::Configuration(format!("Invalid invoice amount: {}", amount))
        })?;

        if !value.is_finite() {
            return Err(GateError::Configuration(format!(
                "Invoice amount must be finite: {}",
                amount
            )));
        }

        let scaled = (value * 10_f64.powi(currency.decimal_places() as i32)).round();
        if scaled >= i64::MAX as f64 {
            return Err(GateError::Configuration(format!(
                "Invoice amount too large: {}",
                amount
            )));
        }

        let smallest = currency.to_smallest_unit(value);
        if smallest <= 0 {
            return Err(GateError::Configuration(format!(
                "Invoice amount must be positive: {}",
                amount
            )));
        }

        Ok(Self::from_cents(smallest, currency))
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_smallest_unit(self.amount)
    }

    /// Decimal string as sent to the processor (e.g., "0.01")
    pub fn decimal_string(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{:.*}", places, self.as_decimal())
    }

    /// Format for display (e.g., "0.01 USD")
    pub fn display(&self) -> String {
        format!("{} {}", self.decimal_string(), self.currency)
    }
}

impl Default for Price {
    /// One cent, the gate's standing price
    fn default() -> Self {
        Self::from_cents(1, Currency::USD)
    }
}
