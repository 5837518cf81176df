//! Market data types shared by every market data source.

use crate::error::{DataError, Result};
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time market data for one ticker.
///
/// Snapshots are immutable once built. Staleness is not tracked beyond the
/// `as_of` timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Ticker the snapshot belongs to
    pub ticker: Ticker,
    /// Last traded price
    pub price: f64,
    /// Shares outstanding
    pub shares_outstanding: f64,
    /// Enterprise value as reported by the data source
    pub reported_enterprise_value: Option<f64>,
    /// Total debt
    pub total_debt: Option<f64>,
    /// Total cash and equivalents
    pub total_cash: Option<f64>,
    /// Quote currency (ISO-4217)
    pub currency: String,
    /// When the snapshot was taken
    pub as_of: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Create a USD snapshot from price and shares outstanding.
    ///
    /// # Errors
    /// Returns [`DataError::MissingData`] unless both inputs are finite and positive.
    pub fn new(ticker: Ticker, price: f64, shares_outstanding: f64) -> Result<Self> {
        if !(price.is_finite() && price > 0.0) {
            return Err(DataError::MissingData {
                symbol: ticker.to_string(),
                reason: format!("invalid price {price}"),
            });
        }
        if !(shares_outstanding.is_finite() && shares_outstanding > 0.0) {
            return Err(DataError::MissingData {
                symbol: ticker.to_string(),
                reason: format!("invalid shares outstanding {shares_outstanding}"),
            });
        }

        Ok(Self {
            ticker,
            price,
            shares_outstanding,
            reported_enterprise_value: None,
            total_debt: None,
            total_cash: None,
            currency: "USD".to_string(),
            as_of: Utc::now(),
        })
    }

    /// Attach a reported enterprise value.
    pub const fn with_enterprise_value(mut self, enterprise_value: Option<f64>) -> Self {
        self.reported_enterprise_value = enterprise_value;
        self
    }

    /// Attach balance sheet inputs used when no enterprise value is reported.
    pub const fn with_balance_sheet(mut self, total_debt: Option<f64>, total_cash: Option<f64>) -> Self {
        self.total_debt = total_debt;
        self.total_cash = total_cash;
        self
    }

    /// Set the quote currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Market capitalization: price times shares outstanding.
    pub fn market_cap(&self) -> f64 {
        self.price * self.shares_outstanding
    }

    /// Enterprise value.
    ///
    /// Uses the reported value when present, otherwise market cap plus debt
    /// minus cash, where a missing component counts as zero.
    pub fn enterprise_value(&self) -> f64 {
        self.reported_enterprise_value.unwrap_or_else(|| {
            self.market_cap() + self.total_debt.unwrap_or(0.0) - self.total_cash.unwrap_or(0.0)
        })
    }

    /// Restate monetary fields in USD given the USD value of one unit of the quote currency.
    ///
    /// # Errors
    /// Returns [`DataError::MissingData`] if `usd_per_unit` is not finite and positive.
    pub fn to_usd(&self, usd_per_unit: f64) -> Result<Self> {
        if !(usd_per_unit.is_finite() && usd_per_unit > 0.0) {
            return Err(DataError::MissingData {
                symbol: self.ticker.to_string(),
                reason: format!("invalid {} to USD rate {usd_per_unit}", self.currency),
            });
        }

        let convert = |v: Option<f64>| v.map(|v| v * usd_per_unit);
        Ok(Self {
            ticker: self.ticker.clone(),
            price: self.price * usd_per_unit,
            shares_outstanding: self.shares_outstanding,
            reported_enterprise_value: convert(self.reported_enterprise_value),
            total_debt: convert(self.total_debt),
            total_cash: convert(self.total_cash),
            currency: "USD".to_string(),
            as_of: self.as_of,
        })
    }

    /// Whether prices are quoted in US dollars.
    pub fn is_usd(&self) -> bool {
        self.currency.eq_ignore_ascii_case("USD")
    }
}

/// Descriptive information about a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol
    pub ticker: String,
    /// Long company name
    pub name: Option<String>,
    /// Industry classification (e.g. "Consumer Electronics")
    pub industry: Option<String>,
    /// Sector classification (e.g. "Technology")
    pub sector: Option<String>,
}

/// Market snapshot and profile of one company, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketQuote {
    /// Price, shares and enterprise value inputs
    pub snapshot: MarketSnapshot,
    /// Name and industry classification
    pub profile: CompanyProfile,
}

/// A single ticker search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Ticker symbol
    pub symbol: String,
    /// Short display name
    pub name: Option<String>,
    /// Listing exchange
    pub exchange: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ticker() -> Ticker {
        Ticker::parse("TEST").unwrap()
    }

    #[test]
    fn test_market_cap() {
        let snap = MarketSnapshot::new(ticker(), 50.0, 10.0).unwrap();
        assert_relative_eq!(snap.market_cap(), 500.0);
    }

    #[test]
    fn test_enterprise_value_prefers_reported() {
        let snap = MarketSnapshot::new(ticker(), 50.0, 10.0)
            .unwrap()
            .with_enterprise_value(Some(650.0))
            .with_balance_sheet(Some(100.0), Some(20.0));
        assert_relative_eq!(snap.enterprise_value(), 650.0);
    }

    #[test]
    fn test_enterprise_value_from_balance_sheet() {
        let snap = MarketSnapshot::new(ticker(), 50.0, 10.0)
            .unwrap()
            .with_balance_sheet(Some(100.0), Some(20.0));
        assert_relative_eq!(snap.enterprise_value(), 580.0);

        let bare = MarketSnapshot::new(ticker(), 50.0, 10.0).unwrap();
        assert_relative_eq!(bare.enterprise_value(), 500.0);
    }

    #[test]
    fn test_to_usd() {
        let snap = MarketSnapshot::new(ticker(), 1000.0, 10.0)
            .unwrap()
            .with_currency("JPY")
            .with_enterprise_value(Some(12_000.0));
        assert!(!snap.is_usd());

        let usd = snap.to_usd(0.0067).unwrap();
        assert!(usd.is_usd());
        assert_relative_eq!(usd.market_cap(), 67.0, epsilon = 1e-9);
        assert_relative_eq!(usd.enterprise_value(), 80.4, epsilon = 1e-9);
        assert!(snap.to_usd(0.0).is_err());
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(MarketSnapshot::new(ticker(), 0.0, 10.0).is_err());
        assert!(MarketSnapshot::new(ticker(), f64::NAN, 10.0).is_err());
        assert!(MarketSnapshot::new(ticker(), 10.0, -1.0).is_err());
    }
}
