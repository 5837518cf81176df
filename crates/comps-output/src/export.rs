//! Export functionality for comparable-company results.
//!
//! CSV output is one flat row per company with amounts in USD millions, which
//! opens cleanly in a spreadsheet. JSON output is the full nested report.

use crate::report::CompsReport;
use chrono::NaiveDate;
use comps_valuation::{ComparableEntry, FinancialRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer produced invalid UTF-8.
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Conventional export file name, e.g. `comps_AAPL_20250114.csv`.
pub fn default_filename(target: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "comps_{}_{}.{}",
        target.to_ascii_uppercase(),
        date.format("%Y%m%d"),
        format.extension()
    )
}

/// One company flattened for CSV export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparableRow {
    /// Company identifier.
    pub ticker: String,

    /// Company name, when known.
    pub name: Option<String>,

    /// Fiscal year of the figures.
    pub fiscal_year: i32,

    /// Date the source filing was accepted.
    pub filing_date: Option<NaiveDate>,

    /// `xbrl` or `language-model`.
    pub source: String,

    /// Revenue in millions.
    pub revenue_m: f64,

    /// Net income in millions.
    pub net_income_m: f64,

    /// EBITDA in millions.
    pub ebitda_m: f64,

    /// Net margin in percent.
    pub net_margin_pct: Option<f64>,

    /// Market capitalization.
    pub market_cap: f64,

    /// Enterprise value.
    pub enterprise_value: f64,

    /// Price to earnings, empty when not applicable.
    pub pe: Option<f64>,

    /// Enterprise value to revenue.
    pub ev_revenue: Option<f64>,

    /// Enterprise value to EBITDA.
    pub ev_ebitda: Option<f64>,

    /// Price to sales.
    pub ps: Option<f64>,
}

impl From<&ComparableEntry> for ComparableRow {
    fn from(entry: &ComparableEntry) -> Self {
        Self {
            ticker: entry.ticker.to_string(),
            name: entry.name.clone(),
            fiscal_year: entry.record.fiscal_year,
            filing_date: entry.record.filing_date,
            source: entry.record.source.to_string(),
            revenue_m: entry.record.revenue / 1e6,
            net_income_m: entry.record.net_income / 1e6,
            ebitda_m: entry.record.ebitda / 1e6,
            net_margin_pct: entry.net_margin.value().map(|m| m * 100.0),
            market_cap: entry.market_cap,
            enterprise_value: entry.enterprise_value,
            pe: entry.pe.value(),
            ev_revenue: entry.ev_revenue.value(),
            ev_ebitda: entry.ev_ebitda.value(),
            ps: entry.ps.value(),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;
}

fn write_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

impl Exporter for CompsReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self.entries.iter().map(ComparableRow::from)),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for FinancialRecord {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv([self]),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
