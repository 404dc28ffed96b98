//! Currency conversion abstractions

use crate::core::error::ConversionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A three letter ISO 4217 style currency code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(anyhow::anyhow!("Invalid currency code: {}", s));
        }
        Ok(CurrencyCode(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> String {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source and target currency of every conversion in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyPair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// A finite, non-negative amount entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Result<Self, ConversionError> {
        if !value.is_finite() {
            return Err(ConversionError::InvalidAmount {
                input: value.to_string(),
                reason: "amount must be a finite number".to_string(),
            });
        }
        if value < 0.0 {
            return Err(ConversionError::InvalidAmount {
                input: value.to_string(),
                reason: "amount must not be negative".to_string(),
            });
        }
        // Folds -0.0 into 0.0
        Ok(Amount(value + 0.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let value: f64 = input.parse().map_err(|_| ConversionError::InvalidAmount {
            input: s.to_string(),
            reason: "not a number".to_string(),
        })?;
        Amount::new(value).map_err(|e| match e {
            ConversionError::InvalidAmount { reason, .. } => ConversionError::InvalidAmount {
                input: s.to_string(),
                reason,
            },
            other => other,
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one successful conversion request.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: Amount,
    pub pair: CurrencyPair,
    pub result: f64,
    pub rate: Option<f64>,
    pub quoted_at: DateTime<Utc>,
}

#[async_trait]
pub trait ConversionProvider: Send + Sync {
    async fn convert(
        &self,
        amount: Amount,
        pair: &CurrencyPair,
    ) -> Result<Conversion, ConversionError>;
}
