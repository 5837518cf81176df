//! Traits the comps pipeline is generic over.
//!
//! Each trait describes one external collaborator. The concrete clients in
//! this crate implement them against live services; tests implement them
//! with in-memory fakes.

use crate::edgar::{FilingDocument, XbrlDocument};
use crate::error::Result;
use crate::market::{CompanyProfile, MarketQuote, SearchHit};
use crate::ticker::Ticker;
use std::future::Future;

/// Source of regulatory filings.
pub trait FilingSource {
    /// Fetch the most recent annual filing (10-K or 20-F) for a company.
    fn latest_annual_filing(
        &self,
        ticker: &Ticker,
    ) -> impl Future<Output = Result<FilingDocument>> + Send;

    /// Fetch structured XBRL facts for a company, keyed by its CIK.
    fn company_facts(&self, cik: &str) -> impl Future<Output = Result<XbrlDocument>> + Send;
}

/// Source of market data.
pub trait MarketDataSource {
    /// Current market snapshot together with the company profile, in one lookup.
    fn quote(&self, ticker: &Ticker) -> impl Future<Output = Result<MarketQuote>> + Send;

    /// Company name and industry classification.
    fn profile(&self, ticker: &Ticker) -> impl Future<Output = Result<CompanyProfile>> + Send;

    /// USD per one unit of `currency`.
    fn usd_rate(&self, currency: &str) -> impl Future<Output = Result<f64>> + Send;

    /// Search tickers by company name or symbol.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SearchHit>>> + Send;
}

/// A hosted text-generation model.
pub trait LanguageModel {
    /// Send a single prompt and return the model's text response.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
