//! The structured financial record extracted from one annual filing.

use crate::error::ValuationError;
use crate::multiples::{self, Multiple};
use chrono::NaiveDate;
use comps_data::Ticker;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Where the figures of a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ExtractionSource {
    /// SEC XBRL company facts
    #[display("xbrl")]
    Xbrl,
    /// Language model reading the filing document
    #[display("language-model")]
    LanguageModel,
}

/// Revenue, net income and EBITDA for one company and fiscal year.
///
/// Amounts are absolute units of `currency` (not thousands or millions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Company the record describes
    pub ticker: Ticker,
    /// Total revenue
    pub revenue: f64,
    /// Net income attributable to the company
    pub net_income: f64,
    /// Operating income plus depreciation and amortization
    pub ebitda: f64,
    /// ISO-4217 reporting currency
    pub currency: String,
    /// Fiscal year the figures cover
    pub fiscal_year: i32,
    /// Date the source filing was accepted
    pub filing_date: Option<NaiveDate>,
    /// How the figures were obtained
    pub source: ExtractionSource,
}

impl FinancialRecord {
    /// Net income over revenue, not applicable when revenue is zero or negative.
    pub fn net_margin(&self) -> Multiple {
        multiples::net_margin(self.net_income, self.revenue)
    }

    /// Whether amounts are in US dollars.
    pub fn is_usd(&self) -> bool {
        self.currency.eq_ignore_ascii_case("USD")
    }

    /// Restate the record in USD given the USD value of one unit of its currency.
    ///
    /// # Errors
    /// Returns [`ValuationError::InvalidFxRate`] unless the rate is finite and positive.
    pub fn to_usd(&self, usd_per_unit: f64) -> Result<Self, ValuationError> {
        if !(usd_per_unit.is_finite() && usd_per_unit > 0.0) {
            return Err(ValuationError::InvalidFxRate {
                currency: self.currency.clone(),
                rate: usd_per_unit,
            });
        }

        Ok(Self {
            revenue: self.revenue * usd_per_unit,
            net_income: self.net_income * usd_per_unit,
            ebitda: self.ebitda * usd_per_unit,
            currency: "USD".to_string(),
            ticker: self.ticker.clone(),
            ..*self
        })
    }
}
