#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/comps/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod edgar;
pub mod error;
pub mod gemini;
pub mod market;
pub mod source;
pub mod ticker;
pub mod yahoo;

pub use edgar::{EdgarClient, FilingDocument, FilingForm};
pub use error::{DataError, Result};
pub use gemini::GeminiClient;
pub use market::{CompanyProfile, MarketQuote, MarketSnapshot, SearchHit};
pub use source::{FilingSource, LanguageModel, MarketDataSource};
pub use ticker::Ticker;
pub use yahoo::YahooMarketData;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
