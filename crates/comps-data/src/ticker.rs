//! Company identifiers.

use crate::error::{DataError, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A normalized company identifier: an exchange ticker (e.g. `AAPL`, `BRK-B`)
/// or a numeric SEC CIK.
///
/// Identifiers are upper-cased on construction so joins are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize an identifier.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidSymbol`] for empty input or characters other
    /// than ASCII alphanumerics, `.`, `-` and `=`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '='))
        {
            return Err(DataError::InvalidSymbol(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is a numeric SEC CIK rather than a ticker.
    pub fn is_cik(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl FromStr for Ticker {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
