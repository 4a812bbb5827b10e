// src/money.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type AmountValue = i64;

/// An exact monetary amount in whole currency units.
///
/// Bids and reserve prices are compared exactly; there is no floating
/// point anywhere in the bidding path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Amount(AmountValue);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = AmountValue::deserialize(deserializer)?;
        Amount::new(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount must not be negative: {0}")]
    Negative(AmountValue),

    #[error("invalid amount: {0}")]
    Invalid(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn new(value: AmountValue) -> Result<Self, MoneyError> {
        if value < 0 {
            Err(MoneyError::Negative(value))
        } else {
            Ok(Amount(value))
        }
    }

    pub fn value(&self) -> AmountValue {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<AmountValue>()
            .map_err(|_| MoneyError::Invalid(s.to_string()))?;
        Amount::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(Amount::new(-1), Err(MoneyError::Negative(-1)));
        assert!(Amount::new(0).is_ok());
        assert!(Amount::new(250).is_ok());
    }

    #[test]
    fn parses_and_displays() {
        let amount = Amount::from_str("4500").unwrap();
        assert_eq!(amount.value(), 4500);
        assert_eq!(amount.to_string(), "4500");
        assert!(Amount::from_str("-5").is_err());
        assert!(Amount::from_str("abc").is_err());
    }
}
