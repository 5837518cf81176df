//! Structured extraction of financial records from annual filings.
//!
//! Two paths produce a [`FinancialRecord`]:
//!
//! - [`record_from_facts`] reads SEC XBRL company facts directly.
//! - [`StructuredExtractor`] hands the filing's income statement to a language
//!   model. It first asks which column covers which fiscal year, then reads
//!   only the latest column. If either answer breaks the schema a single
//!   "most recent period" request is sent instead. A record is only ever
//!   built from a schema-valid response.
//!
//! The extractor never retries a failed service call; callers own retry.

pub mod prompts;
pub mod schema;
pub mod xbrl;

pub use schema::{ColumnYear, ExtractedFigures, parse_columns, parse_figures, to_millions};
pub use xbrl::record_from_facts;

use crate::error::ExtractionError;
use crate::record::{ExtractionSource, FinancialRecord};
use comps_data::{FilingDocument, LanguageModel, Ticker};
use tracing::{debug, warn};

/// Default cap on the filing excerpt sent with each prompt.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 60_000;

/// Language-model backed extractor.
#[derive(Debug)]
pub struct StructuredExtractor<M> {
    model: M,
    max_prompt_chars: usize,
}

impl<M: LanguageModel> StructuredExtractor<M> {
    /// Create an extractor with the default excerpt size.
    pub const fn new(model: M) -> Self {
        Self {
            model,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }

    /// Limit the characters of filing text sent per prompt.
    pub const fn with_max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    /// The underlying model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Extract revenue, net income and EBITDA from a filing.
    ///
    /// The fiscal year comes from the response, else the latest column's year,
    /// else the year of the report date, else the year before filing.
    ///
    /// # Errors
    /// Returns an [`ExtractionError`] when the filing has no text, the model
    /// cannot be reached, or no response satisfies the schema.
    pub async fn extract(&self, filing: &FilingDocument) -> Result<FinancialRecord, ExtractionError> {
        let statement = filing.statement_excerpt(self.max_prompt_chars)?;
        let ticker = &filing.ticker;
        debug!(%ticker, chars = statement.len(), "extracting with language model");

        let (figures, column_year) = match self.two_step(ticker, &statement).await {
            Ok(result) => result,
            Err(e) if e.is_schema_violation() => {
                warn!(%ticker, error = %e, "two-step extraction failed, using single prompt");
                let response = self
                    .model
                    .generate(&prompts::most_recent_period(ticker, &statement))
                    .await?;
                (parse_figures(&response)?, None)
            }
            Err(e) => return Err(e),
        };

        let fiscal_year = figures
            .fiscal_year
            .or(column_year)
            .or_else(|| filing.report_year())
            .unwrap_or_else(|| filing.filing_year() - 1);

        Ok(FinancialRecord {
            ticker: ticker.clone(),
            revenue: figures.revenue * 1e6,
            net_income: figures.net_income * 1e6,
            ebitda: figures.ebitda * 1e6,
            currency: figures.reporting_currency,
            fiscal_year,
            filing_date: Some(filing.filing_date),
            source: ExtractionSource::LanguageModel,
        })
    }

    async fn two_step(
        &self,
        ticker: &Ticker,
        statement: &str,
    ) -> Result<(ExtractedFigures, Option<i32>), ExtractionError> {
        let listing = self
            .model
            .generate(&prompts::column_listing(ticker, statement))
            .await?;
        let columns = parse_columns(&listing)?;
        let latest = schema::latest_column(&columns).ok_or(ExtractionError::NoColumns)?;
        debug!(%ticker, header = %latest.header, year = latest.year, "latest column");

        let response = self
            .model
            .generate(&prompts::single_column(
                ticker,
                &latest.header,
                latest.year,
                statement,
            ))
            .await?;
        Ok((parse_figures(&response)?, Some(latest.year)))
    }
}
