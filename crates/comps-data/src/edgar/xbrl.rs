//! XBRL company facts from SEC EDGAR.
//!
//! The SEC publishes every XBRL fact a company has filed at
//! `https://data.sec.gov/api/xbrl/companyfacts/CIK{cik_padded}.json`.
//! This module flattens that document into [`XbrlFact`] values and answers
//! the one question the extractor needs: what did the company report for a
//! concept in a given fiscal year's annual report.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a single XBRL fact (data point).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XbrlFact {
    /// The XBRL concept name (e.g., "us-gaap:NetIncomeLoss")
    pub concept: String,

    /// The numeric value of the fact
    pub value: f64,

    /// Unit of measure (e.g., "USD", "JPY", "shares")
    pub unit: String,

    /// End date of the reporting period
    pub period_end: NaiveDate,

    /// Start date of the reporting period (None for instant facts like balance sheet items)
    pub period_start: Option<NaiveDate>,

    /// Form type (e.g., "10-K", "20-F")
    pub form: Option<String>,

    /// Fiscal year of the filing that reported the fact
    pub fiscal_year: Option<i32>,

    /// Fiscal period (e.g., "FY", "Q1")
    pub fiscal_period: Option<String>,
}

impl XbrlFact {
    /// Returns true if this is an instant fact (point-in-time, like balance sheet items)
    pub const fn is_instant(&self) -> bool {
        self.period_start.is_none()
    }

    /// Returns the duration in days if this is a duration fact
    pub fn duration_days(&self) -> Option<i64> {
        self.period_start
            .map(|start| self.period_end.signed_duration_since(start).num_days())
    }

    /// Whether the fact was reported in an annual report for the full fiscal year.
    pub fn is_annual(&self) -> bool {
        let annual_form = matches!(self.form.as_deref(), Some("10-K" | "20-F"));
        let full_year = self.fiscal_period.as_deref() == Some("FY");
        annual_form && full_year
    }

    /// Whether the fact covers roughly twelve months.
    fn spans_one_year(&self) -> bool {
        self.duration_days()
            .is_some_and(|days| (350..=380).contains(&days))
    }
}

/// Represents a collection of XBRL facts for a company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XbrlDocument {
    /// All facts in the document
    pub facts: Vec<XbrlFact>,

    /// Company name
    pub entity_name: Option<String>,

    /// CIK (Central Index Key)
    pub cik: Option<String>,
}

impl XbrlDocument {
    /// Creates a new empty XBRL document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses XBRL data from the SEC company facts JSON format.
    ///
    /// Facts with unparseable dates are skipped rather than failing the document.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if the body is not a company facts document.
    pub fn parse_json(json: &str) -> Result<Self> {
        let api_response: SecApiResponse = serde_json::from_str(json)
            .map_err(|e| DataError::Parse(format!("Failed to parse SEC JSON: {}", e)))?;

        let mut facts = Vec::new();

        for (taxonomy, concepts) in &api_response.facts {
            for (concept_name, concept_data) in concepts {
                let full_concept = format!("{}:{}", taxonomy, concept_name);

                for (unit, unit_facts) in &concept_data.units {
                    for fact_data in unit_facts {
                        let Ok(period_end) = NaiveDate::parse_from_str(&fact_data.end, "%Y-%m-%d")
                        else {
                            continue;
                        };
                        let period_start = fact_data
                            .start
                            .as_deref()
                            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

                        facts.push(XbrlFact {
                            concept: full_concept.clone(),
                            value: fact_data.val,
                            unit: unit.clone(),
                            period_end,
                            period_start,
                            form: fact_data.form.clone(),
                            fiscal_year: fact_data.fy,
                            fiscal_period: fact_data.fp.clone(),
                        });
                    }
                }
            }
        }

        let cik = match api_response.cik {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) => Some(s),
            _ => None,
        };

        Ok(Self {
            facts,
            entity_name: api_response.entity_name,
            cik,
        })
    }

    /// The latest fiscal year covered by an annual report.
    pub fn latest_annual_fiscal_year(&self) -> Option<i32> {
        self.facts
            .iter()
            .filter(|f| f.is_annual())
            .filter_map(|f| f.fiscal_year)
            .max()
    }

    /// The full-year value a company reported for a concept in one fiscal year's
    /// annual report.
    ///
    /// An annual report also carries prior-year comparatives tagged with the same
    /// fiscal year, so among the twelve-month facts the one with the latest
    /// period end is the current year. Concepts are tried in order; the first
    /// concept with a match wins.
    pub fn annual_value(&self, concepts: &[&str], fiscal_year: i32) -> Option<&XbrlFact> {
        concepts.iter().find_map(|concept| {
            self.facts
                .iter()
                .filter(|f| {
                    f.concept == *concept
                        && f.is_annual()
                        && f.fiscal_year == Some(fiscal_year)
                        && f.spans_one_year()
                })
                .max_by_key(|f| f.period_end)
        })
    }
}

// SEC API JSON structure
// Based on: https://www.sec.gov/edgar/sec-api-documentation

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecApiResponse {
    cik: serde_json::Value,
    #[serde(default)]
    entity_name: Option<String>,
    facts: HashMap<String, HashMap<String, ConceptData>>,
}

#[derive(Debug, Deserialize)]
struct ConceptData {
    #[serde(default)]
    units: HashMap<String, Vec<FactData>>,
}

#[derive(Debug, Deserialize)]
struct FactData {
    end: String,
    val: f64,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    fy: Option<i32>,
    #[serde(default)]
    fp: Option<String>,
    #[serde(default)]
    form: Option<String>,
}

/// Income statement concepts used by the extractor, in fallback order.
///
/// Companies and even the same company across periods use different tags for
/// the same line item; IFRS filers (20-F) report under `ifrs-full`.
pub mod concepts {
    /// Total revenue
    pub const REVENUE: &[&str] = &[
        "us-gaap:Revenues",
        "us-gaap:RevenueFromContractWithCustomerExcludingAssessedTax",
        "us-gaap:SalesRevenueNet",
        "us-gaap:RevenueFromContractWithCustomerIncludingAssessedTax",
        "ifrs-full:Revenue",
    ];

    /// Net income (loss)
    pub const NET_INCOME: &[&str] = &[
        "us-gaap:NetIncomeLoss",
        "us-gaap:ProfitLoss",
        "us-gaap:NetIncomeLossAvailableToCommonStockholdersBasic",
        "ifrs-full:ProfitLossAttributableToOwnersOfParent",
        "ifrs-full:ProfitLoss",
    ];

    /// Operating income (loss)
    pub const OPERATING_INCOME: &[&str] = &[
        "us-gaap:OperatingIncomeLoss",
        "ifrs-full:ProfitLossFromOperatingActivities",
    ];

    /// Depreciation and amortization
    pub const DEPRECIATION_AMORTIZATION: &[&str] = &[
        "us-gaap:DepreciationDepletionAndAmortization",
        "us-gaap:DepreciationAndAmortization",
        "us-gaap:DepreciationAmortizationAndAccretionNet",
        "us-gaap:Depreciation",
        "ifrs-full:DepreciationAndAmortisationExpense",
    ];
}
