//! Parsing of Yahoo Finance `quoteSummary` and search responses.

use crate::error::{DataError, Result};
use crate::market::{CompanyProfile, MarketQuote, MarketSnapshot, SearchHit};
use crate::ticker::Ticker;
use serde::Deserialize;

/// Modules requested from the `quoteSummary` endpoint.
pub(crate) const SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";

/// Parse a `quoteSummary` body for `ticker`.
///
/// Shares outstanding fall back to market cap over price when Yahoo does
/// not report them. Debt and cash are dropped when the financial statements
/// are in a different currency than the quote, since they could not be
/// combined with market cap.
///
/// # Errors
/// Returns [`DataError::MissingData`] when Yahoo reports an error or the
/// response lacks a usable price or share count.
pub fn parse_quote_summary(ticker: &Ticker, body: &str) -> Result<MarketQuote> {
    let response: QuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("Failed to parse Yahoo quote summary: {}", e)))?;

    let missing = |reason: String| DataError::MissingData {
        symbol: ticker.to_string(),
        reason,
    };

    if let Some(error) = response.quote_summary.error {
        return Err(missing(error.describe()));
    }

    let result = response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| missing("empty quote summary".to_string()))?;

    let price_module = result.price.unwrap_or_default();
    let key_stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();

    let price = RawValue::first(&[&price_module.regular_market_price, &financial.current_price])
        .ok_or_else(|| missing("no market price".to_string()))?;

    let market_cap = RawValue::first(&[&price_module.market_cap, &detail.market_cap]);
    let shares = RawValue::first(&[
        &key_stats.shares_outstanding,
        &key_stats.implied_shares_outstanding,
    ])
    .or_else(|| market_cap.map(|cap| cap / price))
    .ok_or_else(|| missing("no shares outstanding".to_string()))?;

    let currency = price_module
        .currency
        .or(detail.currency)
        .unwrap_or_else(|| "USD".to_string())
        .to_uppercase();

    let same_currency = financial
        .financial_currency
        .as_deref()
        .is_none_or(|c| c.eq_ignore_ascii_case(&currency));
    let (debt, cash) = if same_currency {
        (
            RawValue::first(&[&financial.total_debt]),
            RawValue::first(&[&financial.total_cash]),
        )
    } else {
        (None, None)
    };

    let snapshot = MarketSnapshot::new(ticker.clone(), price, shares)?
        .with_enterprise_value(
            RawValue::first(&[&key_stats.enterprise_value]).filter(|ev| *ev != 0.0),
        )
        .with_balance_sheet(debt, cash)
        .with_currency(currency);

    let profile = CompanyProfile {
        ticker: ticker.to_string(),
        name: price_module.long_name.or(price_module.short_name),
        industry: profile.industry,
        sector: profile.sector,
    };

    Ok(MarketQuote { snapshot, profile })
}

/// Parse a `v1/finance/search` body into at most `limit` hits.
pub(crate) fn parse_search(body: &str, limit: usize) -> Result<Vec<SearchHit>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("Failed to parse Yahoo search: {}", e)))?;

    Ok(response
        .quotes
        .into_iter()
        .filter_map(|q| {
            Some(SearchHit {
                symbol: q.symbol?,
                name: q.shortname.or(q.longname),
                exchange: q.exchange,
            })
        })
        .take(limit)
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn describe(self) -> String {
        self.description
            .or(self.code)
            .unwrap_or_else(|| "Yahoo Finance returned an error".to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(default)]
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    regular_market_price: Option<RawValue>,
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    #[serde(default)]
    shares_outstanding: Option<RawValue>,
    #[serde(default)]
    implied_shares_outstanding: Option<RawValue>,
    #[serde(default)]
    enterprise_value: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    #[serde(default)]
    current_price: Option<RawValue>,
    #[serde(default)]
    total_debt: Option<RawValue>,
    #[serde(default)]
    total_cash: Option<RawValue>,
    #[serde(default)]
    financial_currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfileModule {
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    sector: Option<String>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`, or `{}` when unknown.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl RawValue {
    fn value(&self) -> Option<f64> {
        self.raw.filter(|v| v.is_finite())
    }

    /// First finite value among the candidates.
    fn first(candidates: &[&Option<Self>]) -> Option<f64> {
        candidates
            .iter()
            .find_map(|c| c.as_ref().and_then(Self::value))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    longname: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    const AAPL: &str = r#"{"quoteSummary": {"result": [{
        "price": {
            "regularMarketPrice": {"raw": 227.5, "fmt": "227.50"},
            "marketCap": {"raw": 3440000000000, "fmt": "3.44T"},
            "currency": "USD",
            "longName": "Apple Inc.",
            "shortName": "Apple"
        },
        "summaryDetail": {"currency": "USD"},
        "defaultKeyStatistics": {
            "sharesOutstanding": {"raw": 15115800000},
            "enterpriseValue": {"raw": 3480000000000}
        },
        "financialData": {
            "currentPrice": {"raw": 227.5},
            "totalDebt": {"raw": 106000000000},
            "totalCash": {"raw": 65000000000},
            "financialCurrency": "USD"
        },
        "assetProfile": {"industry": "Consumer Electronics", "sector": "Technology"}
    }], "error": null}}"#;

    #[test]
    fn test_parse_full_summary() {
        let summary = parse_quote_summary(&ticker("AAPL"), AAPL).unwrap();
        let snap = &summary.snapshot;

        assert_relative_eq!(snap.price, 227.5);
        assert_relative_eq!(snap.shares_outstanding, 15_115_800_000.0);
        assert_relative_eq!(snap.enterprise_value(), 3_480_000_000_000.0);
        assert_eq!(snap.total_debt, Some(106_000_000_000.0));
        assert_eq!(snap.currency, "USD");

        assert_eq!(summary.profile.name.as_deref(), Some("Apple Inc."));
        assert_eq!(summary.profile.industry.as_deref(), Some("Consumer Electronics"));
        assert_eq!(summary.profile.sector.as_deref(), Some("Technology"));
    }

    #[test]
    fn test_shares_derived_from_market_cap() {
        let body = r#"{"quoteSummary": {"result": [{
            "price": {"regularMarketPrice": {"raw": 50.0}, "marketCap": {"raw": 500.0}},
            "defaultKeyStatistics": {"sharesOutstanding": {}, "enterpriseValue": {}}
        }]}}"#;
        let summary = parse_quote_summary(&ticker("TEST"), body).unwrap();
        assert_relative_eq!(summary.snapshot.shares_outstanding, 10.0);
        assert_relative_eq!(summary.snapshot.enterprise_value(), 500.0);
        assert!(summary.profile.name.is_none());
    }

    #[test]
    fn test_foreign_financials_drop_balance_sheet() {
        let body = r#"{"quoteSummary": {"result": [{
            "price": {"regularMarketPrice": {"raw": 20.0}, "currency": "USD"},
            "defaultKeyStatistics": {"sharesOutstanding": {"raw": 100.0}},
            "financialData": {
                "totalDebt": {"raw": 999999.0},
                "totalCash": {"raw": 1.0},
                "financialCurrency": "JPY"
            }
        }]}}"#;
        let summary = parse_quote_summary(&ticker("SONY"), body).unwrap();
        assert!(summary.snapshot.total_debt.is_none());
        assert_relative_eq!(summary.snapshot.enterprise_value(), 2000.0);
    }

    #[test]
    fn test_yahoo_error() {
        let body = r#"{"quoteSummary": {"result": null, "error": {
            "code": "Not Found", "description": "Quote not found for symbol: ZZZZ"
        }}}"#;
        let err = parse_quote_summary(&ticker("ZZZZ"), body).unwrap_err();
        assert!(matches!(err, DataError::MissingData { ref reason, .. } if reason.contains("Quote not found")));
    }

    #[test]
    fn test_missing_price() {
        let body = r#"{"quoteSummary": {"result": [{"price": {}}]}}"#;
        let err = parse_quote_summary(&ticker("TEST"), body).unwrap_err();
        assert!(matches!(err, DataError::MissingData { .. }));
    }

    #[test]
    fn test_parse_search() {
        let body = r#"{"quotes": [
            {"symbol": "AAPL", "shortname": "Apple Inc.", "exchange": "NMS", "quoteType": "EQUITY"},
            {"shortname": "no symbol"},
            {"symbol": "APLE", "longname": "Apple Hospitality REIT", "exchange": "NYQ"},
            {"symbol": "AAPL.MX", "shortname": "Apple Inc.", "exchange": "MEX"}
        ], "news": []}"#;

        let hits = parse_search(body, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].symbol, "AAPL");
        assert_eq!(hits[1].name.as_deref(), Some("Apple Hospitality REIT"));
        assert_eq!(hits[1].exchange.as_deref(), Some("NYQ"));
    }
}
