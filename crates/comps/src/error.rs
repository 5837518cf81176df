//! Error types for the comps facade.

use comps_data::{DataError, Ticker};
use comps_output::ExportError;
use comps_valuation::{ExtractionError, ValuationError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for comps operations.
pub type Result<T> = std::result::Result<T, CompsError>;

/// Errors that stop a command as a whole.
#[derive(Debug, Error)]
pub enum CompsError {
    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// File that was read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::CompsConfig`]
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A peer group needs at least one peer besides the target
    #[error("no peers selected for {0}")]
    EmptyPeerGroup(Ticker),

    /// Client construction or a standalone lookup failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Writing results failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A single-company command failed
    #[error(transparent)]
    Company(#[from] CompanyError),
}

/// Why one company of a peer group produced no entry.
///
/// These never abort a run; they are collected next to the entries.
#[derive(Debug, Error)]
pub enum CompanyError {
    /// Filing, facts, quote or FX rate unavailable
    #[error("{ticker}: fetch failed: {source}")]
    Fetch {
        /// Company identifier
        ticker: Ticker,
        /// Underlying client error
        #[source]
        source: DataError,
    },

    /// The filing could not be turned into a financial record
    #[error("{ticker}: extraction failed: {source}")]
    Extraction {
        /// Company identifier
        ticker: Ticker,
        /// Underlying extraction error
        #[source]
        source: ExtractionError,
    },

    /// The record and market data could not be joined
    #[error("{ticker}: valuation failed: {source}")]
    Valuation {
        /// Company identifier
        ticker: Ticker,
        /// Underlying valuation error
        #[source]
        source: ValuationError,
    },
}

impl CompanyError {
    /// Company the error belongs to.
    pub const fn ticker(&self) -> &Ticker {
        match self {
            Self::Fetch { ticker, .. }
            | Self::Extraction { ticker, .. }
            | Self::Valuation { ticker, .. } => ticker,
        }
    }

    /// Pipeline stage name: `fetch`, `extraction` or `valuation`.
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Extraction { .. } => "extraction",
            Self::Valuation { .. } => "valuation",
        }
    }

    /// Whether a remote service rate limited the request.
    pub const fn is_rate_limit(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_rate_limit(),
            Self::Extraction { source, .. } => source.is_rate_limit(),
            Self::Valuation { .. } => false,
        }
    }

    /// The cause without the ticker prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Fetch { source, .. } => source.to_string(),
            Self::Extraction { source, .. } => source.to_string(),
            Self::Valuation { source, .. } => source.to_string(),
        }
    }
}
