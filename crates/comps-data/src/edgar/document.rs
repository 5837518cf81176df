//! Annual filing documents and the text excerpt handed to the extractor.

use super::filings::FilingForm;
use crate::error::{DataError, Result};
use crate::ticker::Ticker;
use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// The raw primary document of one company's annual filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingDocument {
    /// Ticker the filing was requested for
    pub ticker: Ticker,
    /// SEC Central Index Key, unpadded
    pub cik: String,
    /// Annual form type
    pub form: FilingForm,
    /// Accession number (e.g., "0000320193-24-000123")
    pub accession_number: String,
    /// Date the filing was accepted
    pub filing_date: NaiveDate,
    /// Period end date of the report
    pub report_date: Option<NaiveDate>,
    /// Raw HTML content of the primary document
    pub content: String,
}

impl FilingDocument {
    /// Calendar year the filing was accepted.
    pub fn filing_year(&self) -> i32 {
        self.filing_date.year()
    }

    /// Calendar year of the period end, when EDGAR reports one.
    pub fn report_year(&self) -> Option<i32> {
        self.report_date.map(|d| d.year())
    }

    /// Render the income statement portion of the filing as plain text.
    ///
    /// Tables mentioning both revenue and net income are rendered one row per
    /// line with cells joined by `" | "`. Documents without such tables fall
    /// back to their whitespace-collapsed text. The result is cut to at most
    /// `max_chars` characters on a word boundary.
    ///
    /// # Errors
    /// Returns [`DataError::MissingData`] if the document has no text at all.
    pub fn statement_excerpt(&self, max_chars: usize) -> Result<String> {
        let html = Html::parse_document(&self.content);
        let tables = selector("table")?;
        let rows = selector("tr")?;
        let cells = selector("td, th")?;

        let rendered: Vec<String> = html
            .select(&tables)
            .filter(|table| is_income_statement(&collapsed_text(*table)))
            .map(|table| {
                table
                    .select(&rows)
                    .filter_map(|row| {
                        let values: Vec<String> = row
                            .select(&cells)
                            .map(collapsed_text)
                            .filter(|v| !v.is_empty())
                            .collect();
                        (!values.is_empty()).then(|| values.join(" | "))
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|t| !t.is_empty())
            .collect();

        let text = if rendered.is_empty() {
            collapsed_text(html.root_element())
        } else {
            rendered.join("\n\n")
        };

        if text.is_empty() {
            return Err(DataError::MissingData {
                symbol: self.ticker.to_string(),
                reason: format!("filing {} has no text content", self.accession_number),
            });
        }

        Ok(truncate_on_word(&text, max_chars).to_string())
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::Parse(format!("invalid selector {css}: {e}")))
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_income_statement(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_revenue = lower.contains("revenue") || lower.contains("sales");
    let has_income =
        lower.contains("net income") || lower.contains("earnings") || lower.contains("profit");
    has_revenue && has_income
}

/// Cut `text` to at most `max_chars` characters, backing off to the last whitespace.
fn truncate_on_word(text: &str, max_chars: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    let head = &text[..cut];
    match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => head[..space].trim_end(),
        _ => head,
    }
}
