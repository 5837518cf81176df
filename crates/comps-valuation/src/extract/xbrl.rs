//! Programmatic extraction from SEC XBRL company facts.

use crate::record::{ExtractionSource, FinancialRecord};
use chrono::NaiveDate;
use comps_data::Ticker;
use comps_data::edgar::{XbrlDocument, XbrlFact, concepts};
use tracing::debug;

/// Build a record from the latest annual fiscal year in `facts`.
///
/// Revenue, net income and operating income must all be reported, in the same
/// currency. Depreciation and amortization count as zero when untagged, so
/// EBITDA falls back to operating income. Returns `None` when the facts cannot
/// support a record and the filing text has to be read instead.
pub fn record_from_facts(
    ticker: &Ticker,
    facts: &XbrlDocument,
    filing_date: Option<NaiveDate>,
) -> Option<FinancialRecord> {
    let fiscal_year = facts.latest_annual_fiscal_year()?;
    let value = |tags: &[&str]| facts.annual_value(tags, fiscal_year);

    let (Some(revenue), Some(net_income), Some(operating_income)) = (
        value(concepts::REVENUE),
        value(concepts::NET_INCOME),
        value(concepts::OPERATING_INCOME),
    ) else {
        debug!(%ticker, fiscal_year, "XBRL facts incomplete");
        return None;
    };

    let currency = revenue.unit.as_str();
    if !is_currency_unit(currency)
        || net_income.unit != currency
        || operating_income.unit != currency
    {
        debug!(%ticker, fiscal_year, "XBRL facts in mixed or non-monetary units");
        return None;
    }

    let dep_amort = value(concepts::DEPRECIATION_AMORTIZATION)
        .filter(|f| f.unit == currency)
        .map_or(0.0, |f: &XbrlFact| f.value);

    Some(FinancialRecord {
        ticker: ticker.clone(),
        revenue: revenue.value,
        net_income: net_income.value,
        ebitda: operating_income.value + dep_amort,
        currency: currency.to_string(),
        fiscal_year,
        filing_date,
        source: ExtractionSource::Xbrl,
    })
}

fn is_currency_unit(unit: &str) -> bool {
    unit.len() == 3 && unit.chars().all(|c| c.is_ascii_uppercase())
}
