//! SEC EDGAR data fetching and parsing.
//!
//! This module provides access to SEC EDGAR filings including:
//! - Company CIK lookup from ticker symbols
//! - Latest annual report (10-K or 20-F) retrieval
//! - XBRL company facts for programmatic extraction
//!
//! # Example
//!
//! ```no_run
//! use comps_data::edgar::{EdgarClient, concepts};
//! use comps_data::Ticker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdgarClient::new("Jane Analyst jane@example.com")?;
//!     let filing = client.fetch_latest_annual(&Ticker::parse("AAPL")?).await?;
//!     println!("{} {} filed {}", filing.ticker, filing.form, filing.filing_date);
//!
//!     let facts = client.fetch_company_facts(&filing.cik).await?;
//!     if let Some(fy) = facts.latest_annual_fiscal_year()
//!         && let Some(revenue) = facts.annual_value(concepts::REVENUE, fy)
//!     {
//!         println!("FY{fy} revenue: {} {}", revenue.value, revenue.unit);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod document;
pub mod filings;
pub mod xbrl;

// Re-export main types
pub use client::EdgarClient;
pub use document::FilingDocument;
pub use filings::{CikLookup, CompanyFilings, FilingForm, FilingHistory, FilingInfo, RecentFilings};
pub use xbrl::{XbrlDocument, XbrlFact, concepts};
