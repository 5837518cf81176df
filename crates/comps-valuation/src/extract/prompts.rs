//! Prompts sent to the language model.

use comps_data::Ticker;

/// Ask for every data column of the statement and the fiscal year it covers.
pub fn column_listing(ticker: &Ticker, statement: &str) -> String {
    format!(
        "The financial statement below has one column per reporting period. \
         For every DATA column (not the line-item labels), give the header exactly as printed \
         and the fiscal year it covers, read from the header \
         (for example \"Year ended December 31, 2024\" is 2024).\n\
         Respond with JSON only, in this shape:\n\
         {{\"columns\": [{{\"header\": \"<header text>\", \"year\": 2024}}]}}\n\n\
         Statement for {ticker}:\n{statement}"
    )
}

/// Ask for the four line items from one named column only.
pub fn single_column(ticker: &Ticker, header: &str, fiscal_year: i32, statement: &str) -> String {
    format!(
        "Read values ONLY from the column whose header is exactly \"{header}\". \
         Ignore the label column and every other period.\n\
         Line items: total revenue (or total net sales), net income, operating income, \
         depreciation and amortization.\n\
         {RESPONSE_RULES}\
         Set fiscal_year to {fiscal_year}.\n\n\
         Statement for {ticker}:\n{statement}"
    )
}

/// Single-shot request for the most recent period, used when the two-step exchange fails.
pub fn most_recent_period(ticker: &Ticker, statement: &str) -> String {
    format!(
        "Use ONLY the column for the most recent fiscal year in the statement below. \
         Identify it by the year in its header, not by its position.\n\
         Line items: total revenue (or total net sales), net income, operating income, \
         depreciation and amortization.\n\
         {RESPONSE_RULES}\n\
         Statement for {ticker}:\n{statement}"
    )
}

const RESPONSE_RULES: &str = "Report amounts in MILLIONS as plain JSON numbers \
     (no quotes, commas or currency symbols); losses are negative numbers. \
     Respond with a single JSON object only, no markdown, with keys: \
     revenue, net_income, operating_income, dep_amort, reporting_currency \
     (ISO-4217 code, e.g. USD), fiscal_year.\n";
