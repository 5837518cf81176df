//! Yahoo Finance market data.
//!
//! Quotes, share counts and company profiles come from the `quoteSummary`
//! endpoint; currency conversion rates from `yahoo_finance_api` quote history.

pub mod client;
pub mod fundamentals;
pub mod quotes;

pub use client::YahooMarketData;
pub use fundamentals::parse_quote_summary;
pub use quotes::{FxPair, normalize_currency};
