//! Decimal money amounts kept as validated strings.
//!
//! License costs are recorded for reporting only — no arithmetic is
//! performed on them, so a validated decimal string avoids floating
//! point entirely.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when a money amount fails validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount string is not a plain decimal number.
    #[error("invalid decimal amount: {0:?}")]
    InvalidAmount(String),
    /// The currency code is not three uppercase ASCII letters.
    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),
}

/// A monetary amount with its ISO 4217 currency code.
///
/// The amount is a plain decimal string such as `"1499.99"`. Signs,
/// exponents, and grouping separators are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: String,
    currency: String,
}

impl Money {
    /// Create a validated money value.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] if the amount is not a plain decimal
    /// string or the currency is not a three-letter uppercase code.
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Result<Self, MoneyError> {
        let amount = amount.into();
        let currency = currency.into();
        if !is_valid_decimal(&amount) {
            return Err(MoneyError::InvalidAmount(amount));
        }
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(MoneyError::InvalidCurrency(currency));
        }
        Ok(Self { amount, currency })
    }

    /// The decimal amount string.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// The ISO 4217 currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Whether `s` is an unsigned decimal with at most one dot and digits
/// on both sides of it.
fn is_valid_decimal(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut parts = s.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next();
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match frac {
        None => true,
        Some(f) => !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_amounts() {
        assert!(Money::new("0", "USD").is_ok());
        assert!(Money::new("1499.99", "INR").is_ok());
        assert!(Money::new("100000", "EUR").is_ok());
    }

    #[test]
    fn invalid_amounts() {
        assert!(Money::new("", "USD").is_err());
        assert!(Money::new("-5", "USD").is_err());
        assert!(Money::new("1,000", "USD").is_err());
        assert!(Money::new("1.", "USD").is_err());
        assert!(Money::new(".5", "USD").is_err());
        assert!(Money::new("1e3", "USD").is_err());
        assert!(Money::new("1.2.3", "USD").is_err());
    }

    #[test]
    fn invalid_currencies() {
        assert!(Money::new("10", "usd").is_err());
        assert!(Money::new("10", "US").is_err());
        assert!(Money::new("10", "DOLLARS").is_err());
    }

    #[test]
    fn display() {
        let m = Money::new("1499.99", "INR").unwrap();
        assert_eq!(m.to_string(), "1499.99 INR");
    }

    #[test]
    fn serde_roundtrip() {
        let m = Money::new("250.00", "USD").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, parsed);
    }
}
