//! Error types for extraction and valuation.

use comps_data::DataError;
use serde::Serialize;
use thiserror::Error;

/// A model response, or the filing behind it, could not produce a financial record.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No JSON object could be located in the response
    #[error("response contains no JSON object")]
    NoJsonObject,

    /// The located object is not valid JSON
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// A required field is absent
    #[error("missing required field `{field}`")]
    MissingField {
        /// Field name
        field: &'static str,
    },

    /// A numeric field holds something other than a JSON number
    #[error("field `{field}` must be a number, found {found}")]
    NotANumber {
        /// Field name
        field: &'static str,
        /// JSON type that was found instead
        found: &'static str,
    },

    /// `reporting_currency` is not a three-letter code
    #[error("invalid reporting currency: {0}")]
    InvalidCurrency(String),

    /// `fiscal_year` is not a plausible year
    #[error("invalid fiscal year: {0}")]
    InvalidFiscalYear(String),

    /// The column listing named no data columns
    #[error("no data columns identified")]
    NoColumns,

    /// The filing or the model could not be reached
    #[error(transparent)]
    Source(#[from] DataError),
}

impl ExtractionError {
    /// Whether the underlying service asked us to slow down.
    pub const fn is_rate_limit(&self) -> bool {
        matches!(self, Self::Source(e) if e.is_rate_limit())
    }

    /// Whether the model answered but the answer broke the schema.
    pub const fn is_schema_violation(&self) -> bool {
        !matches!(self, Self::Source(_))
    }
}

/// Why a multiple is mathematically undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
pub enum DivisionError {
    /// Net income is zero or negative
    #[error("net income is zero or negative")]
    NonPositiveEarnings,

    /// Revenue is zero or negative
    #[error("revenue is zero or negative")]
    NonPositiveRevenue,

    /// EBITDA is zero or negative
    #[error("EBITDA is zero or negative")]
    NonPositiveEbitda,

    /// The quotient is infinite or NaN
    #[error("result is not a finite number")]
    NonFinite,
}

/// A record and a snapshot could not be joined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// The record and the snapshot belong to different companies
    #[error("financial record for {record} joined with market data for {snapshot}")]
    IdentifierMismatch {
        /// Ticker of the financial record
        record: String,
        /// Ticker of the market snapshot
        snapshot: String,
    },

    /// Amounts are in different currencies
    #[error("financial record in {record} but market data in {snapshot}")]
    CurrencyMismatch {
        /// Currency of the financial record
        record: String,
        /// Currency of the market snapshot
        snapshot: String,
    },

    /// A currency conversion rate is unusable
    #[error("invalid {currency} to USD rate: {rate}")]
    InvalidFxRate {
        /// Source currency
        currency: String,
        /// Offending rate
        rate: f64,
    },
}
