//! SEC EDGAR ticker lookup and filing history.
//!
//! This module provides functionality to:
//! - Map ticker symbols to CIK numbers
//! - Parse a company's filing history from the submissions API
//! - Select the latest annual report (10-K for domestic, 20-F for foreign filers)

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lookup table for converting ticker symbols to CIK numbers.
///
/// CIK (Central Index Key) is a unique identifier assigned by the SEC to
/// companies filing with EDGAR.
#[derive(Debug, Clone, Default)]
pub struct CikLookup {
    /// Map from ticker to (CIK, company name)
    ticker_to_cik: HashMap<String, (String, String)>,
}

/// Raw company ticker data from SEC JSON.
/// The SEC returns: {"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}
#[derive(Debug, Deserialize)]
struct CompanyTicker {
    cik_str: u64,
    ticker: String,
    title: String,
}

impl CikLookup {
    /// Parse the body of `company_tickers.json`.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if the body is not the expected JSON map.
    pub fn from_json(body: &str) -> Result<Self> {
        let data: HashMap<String, CompanyTicker> = serde_json::from_str(body)
            .map_err(|e| DataError::Parse(format!("Failed to parse company tickers: {}", e)))?;

        let ticker_to_cik = data
            .into_values()
            .map(|company| {
                (
                    company.ticker.to_uppercase(),
                    (company.cik_str.to_string(), company.title),
                )
            })
            .collect();

        Ok(Self { ticker_to_cik })
    }

    /// Look up CIK by ticker symbol.
    ///
    /// # Arguments
    /// * `ticker` - The stock ticker symbol (case-insensitive)
    ///
    /// # Returns
    /// Optional tuple of (CIK, company name)
    pub fn get_cik(&self, ticker: &str) -> Option<&(String, String)> {
        self.ticker_to_cik.get(&ticker.to_uppercase())
    }

    /// Number of tickers in the table.
    pub fn len(&self) -> usize {
        self.ticker_to_cik.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.ticker_to_cik.is_empty()
    }

    /// Pad CIK to 10 digits as required by SEC.
    ///
    /// # Example
    /// ```
    /// # use comps_data::edgar::filings::CikLookup;
    /// let padded = CikLookup::pad_cik("320193");
    /// assert_eq!(padded, "0000320193");
    /// ```
    pub fn pad_cik(cik: &str) -> String {
        format!("{:0>10}", cik)
    }
}

/// Annual report form types handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingForm {
    /// Annual report of a domestic filer
    #[serde(rename = "10-K")]
    TenK,
    /// Annual report of a foreign private issuer
    #[serde(rename = "20-F")]
    TwentyF,
}

impl FilingForm {
    /// All annual forms, in preference order.
    pub const ANNUAL: [Self; 2] = [Self::TenK, Self::TwentyF];

    /// The form type as it appears in EDGAR.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TenK => "10-K",
            Self::TwentyF => "20-F",
        }
    }

    /// Parse an EDGAR form type. Amendments (`10-K/A`) are not annual originals.
    pub fn from_form(form: &str) -> Option<Self> {
        match form {
            "10-K" => Some(Self::TenK),
            "20-F" => Some(Self::TwentyF),
            _ => None,
        }
    }
}

impl fmt::Display for FilingForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Company filings data from SEC EDGAR submissions API.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyFilings {
    /// Central Index Key
    pub cik: String,
    /// Company name
    pub name: String,
    /// Filing history
    pub filings: FilingHistory,
}

/// Container for filing history data.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingHistory {
    /// Recent filings
    pub recent: RecentFilings,
}

/// Recent filings data.
///
/// The SEC API returns filing information as parallel arrays where
/// each index corresponds to a single filing, most recent first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    /// Accession numbers (unique filing identifiers)
    pub accession_number: Vec<String>,
    /// Form types (e.g., "10-K", "20-F", "8-K")
    pub form: Vec<String>,
    /// Filing dates in YYYY-MM-DD format
    pub filing_date: Vec<String>,
    /// Period of report in YYYY-MM-DD format (may be empty)
    #[serde(default)]
    pub report_date: Vec<String>,
    /// Primary document filenames
    pub primary_document: Vec<String>,
}

/// Information about a specific filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingInfo {
    /// Accession number (unique filing identifier)
    pub accession_number: String,
    /// Form type
    pub form: FilingForm,
    /// Filing date
    pub filing_date: NaiveDate,
    /// Period of report, when EDGAR provides one
    pub report_date: Option<NaiveDate>,
    /// Primary document filename
    pub primary_document: String,
}

impl CompanyFilings {
    /// Parse the body of a `submissions/CIK##########.json` response.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if the JSON does not match the submissions layout.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| DataError::Parse(format!("Failed to parse company filings: {}", e)))
    }

    /// Get the most recent annual report (10-K or 20-F).
    pub fn latest_annual(&self) -> Option<FilingInfo> {
        self.all_annual().into_iter().next()
    }

    /// Get all annual reports, most recent first.
    pub fn all_annual(&self) -> Vec<FilingInfo> {
        let recent = &self.filings.recent;

        (0..recent.form.len())
            .filter(|&i| FilingForm::from_form(&recent.form[i]).is_some())
            .filter_map(|i| self.filing_at_index(i).ok())
            .collect()
    }

    /// Extract filing information at a specific index.
    fn filing_at_index(&self, idx: usize) -> Result<FilingInfo> {
        let recent = &self.filings.recent;

        let field = |values: &[String], name: &str| -> Result<String> {
            values
                .get(idx)
                .cloned()
                .ok_or_else(|| DataError::Parse(format!("Filing {} missing {}", idx, name)))
        };

        let form_str = field(&recent.form, "form")?;
        let form = FilingForm::from_form(&form_str)
            .ok_or_else(|| DataError::Parse(format!("Unsupported form type: {}", form_str)))?;

        let filing_date = NaiveDate::parse_from_str(&field(&recent.filing_date, "filingDate")?, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid filing date: {}", e)))?;

        let report_date = recent
            .report_date
            .get(idx)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        Ok(FilingInfo {
            accession_number: field(&recent.accession_number, "accessionNumber")?,
            form,
            filing_date,
            report_date,
            primary_document: field(&recent.primary_document, "primaryDocument")?,
        })
    }
}

impl FilingInfo {
    /// Path of the primary document below the EDGAR archive root.
    ///
    /// # Example
    /// ```
    /// # use comps_data::edgar::filings::{FilingForm, FilingInfo};
    /// # use chrono::NaiveDate;
    /// let filing = FilingInfo {
    ///     accession_number: "0000320193-23-000106".to_string(),
    ///     form: FilingForm::TenK,
    ///     filing_date: NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
    ///     report_date: None,
    ///     primary_document: "aapl-20230930.htm".to_string(),
    /// };
    /// assert_eq!(
    ///     filing.document_path("320193"),
    ///     "Archives/edgar/data/320193/000032019323000106/aapl-20230930.htm"
    /// );
    /// ```
    pub fn document_path(&self, cik: &str) -> String {
        // Archive paths use the unpadded CIK and the accession number without dashes
        let cik_unpadded = cik.trim_start_matches('0');
        let accession_no_dashes = self.accession_number.replace('-', "");

        format!(
            "Archives/edgar/data/{}/{}/{}",
            cik_unpadded, accession_no_dashes, self.primary_document
        )
    }
}
