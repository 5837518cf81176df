//! Yahoo Finance HTTP client with cookie and crumb authentication.

use super::fundamentals::{SUMMARY_MODULES, parse_quote_summary, parse_search};
use super::quotes::FxRates;
use crate::error::{DataError, Result};
use crate::market::{CompanyProfile, MarketQuote, SearchHit};
use crate::source::MarketDataSource;
use crate::ticker::Ticker;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Visiting this host sets the session cookie the crumb is bound to
const COOKIE_URL: &str = "https://fc.yahoo.com";

/// Host of the query APIs
const QUERY_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Yahoo rejects requests without a browser-like agent
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Backoff reported when Yahoo answers 429
const DEFAULT_RETRY_AFTER_MS: u64 = 20_000;

/// Yahoo Finance market data client.
///
/// Holds its own cookie jar and crumb, both of which live and die with the
/// client instance. A crumb rejected with HTTP 401 is refreshed once.
pub struct YahooMarketData {
    client: reqwest::Client,
    crumb: Mutex<Option<String>>,
    cookie_url: String,
    query_base: String,
    fx: FxRates,
}

impl YahooMarketData {
    /// Create a client against the live Yahoo Finance endpoints.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            crumb: Mutex::new(None),
            cookie_url: COOKIE_URL.to_string(),
            query_base: QUERY_BASE_URL.to_string(),
            fx: FxRates::new()?,
        })
    }

    /// Point the client at different hosts, e.g. a local mock server.
    pub fn with_base_urls(mut self, cookie_url: impl Into<String>, query_base: impl Into<String>) -> Self {
        self.cookie_url = cookie_url.into();
        self.query_base = query_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the Set-Cookie header matters; the page itself is usually a 404
        if let Err(e) = self.client.get(&self.cookie_url).send().await {
            debug!(error = %e, "Yahoo cookie request failed");
        }

        let url = format!("{}/v1/test/getcrumb", self.query_base);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::from_status(status, DEFAULT_RETRY_AFTER_MS, "Yahoo crumb"));
        }

        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.len() > 64 || crumb.contains('<') {
            return Err(DataError::Authentication(
                "Yahoo returned an invalid crumb".to_string(),
            ));
        }

        debug!("obtained Yahoo crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn send(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let crumb = self.crumb().await?;
        let url = format!("{}{}", self.query_base, path);
        debug!(%url, "Yahoo request");

        Ok(self
            .client
            .get(&url)
            .query(query)
            .query(&[("crumb", crumb.as_str())])
            .header(reqwest::header::REFERER, "https://finance.yahoo.com/")
            .send()
            .await?)
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)], context: &str) -> Result<String> {
        let mut response = self.send(path, query).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Yahoo crumb rejected, refreshing");
            self.crumb.lock().await.take();
            response = self.send(path, query).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::from_status(status, DEFAULT_RETRY_AFTER_MS, context));
        }
        Ok(response.text().await?)
    }

    /// Fetch price, shares, enterprise value inputs and profile in one request.
    pub async fn quote_summary(&self, ticker: &Ticker) -> Result<MarketQuote> {
        let path = format!(
            "/v10/finance/quoteSummary/{}",
            urlencoding::encode(ticker.as_str())
        );
        let body = self
            .get_text(&path, &[("modules", SUMMARY_MODULES)], "Yahoo quote summary")
            .await?;
        parse_quote_summary(ticker, &body)
    }

    /// Search tickers by name or symbol. Queries under two characters return nothing.
    pub async fn search_tickers(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.chars().count() < 2 || limit == 0 {
            return Ok(Vec::new());
        }

        let count = limit.to_string();
        let body = self
            .get_text(
                "/v1/finance/search",
                &[("q", query), ("quotesCount", count.as_str()), ("newsCount", "0")],
                "Yahoo search",
            )
            .await?;
        parse_search(&body, limit)
    }
}

impl MarketDataSource for YahooMarketData {
    async fn quote(&self, ticker: &Ticker) -> Result<MarketQuote> {
        self.quote_summary(ticker).await
    }

    async fn profile(&self, ticker: &Ticker) -> Result<CompanyProfile> {
        Ok(self.quote_summary(ticker).await?.profile)
    }

    async fn usd_rate(&self, currency: &str) -> Result<f64> {
        self.fx.usd_rate(currency).await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        self.search_tickers(query, limit).await
    }
}

impl std::fmt::Debug for YahooMarketData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooMarketData")
            .field("query_base", &self.query_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SUMMARY: &str = r#"{"quoteSummary": {"result": [{
        "price": {"regularMarketPrice": {"raw": 50.0}, "currency": "USD", "longName": "Acme Corp"},
        "defaultKeyStatistics": {"sharesOutstanding": {"raw": 10.0}},
        "assetProfile": {"industry": "E-Commerce", "sector": "Consumer Cyclical"}
    }]}}"#;

    async fn mock_crumb(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/cookie"))
            .respond_with(ResponseTemplate::new(404).insert_header("Set-Cookie", "A3=session; Path=/"))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/test/getcrumb"))
            .respond_with(ResponseTemplate::new(200).set_body_string("abcCRUMB123"))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> YahooMarketData {
        YahooMarketData::new()
            .unwrap()
            .with_base_urls(format!("{}/cookie", server.uri()), server.uri())
    }

    #[tokio::test]
    async fn test_quote_is_one_request() {
        let server = MockServer::start().await;
        mock_crumb(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ACME"))
            .and(query_param("crumb", "abcCRUMB123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUMMARY))
            .expect(1)
            .mount(&server)
            .await;

        let yahoo = client(&server);
        let quote = yahoo.quote(&Ticker::parse("acme").unwrap()).await.unwrap();
        assert_relative_eq!(quote.snapshot.market_cap(), 500.0);
        assert_eq!(quote.profile.name.as_deref(), Some("Acme Corp"));
        assert_eq!(quote.profile.industry.as_deref(), Some("E-Commerce"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let server = MockServer::start().await;
        mock_crumb(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ACME"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = client(&server)
            .quote(&Ticker::parse("ACME").unwrap())
            .await;
        assert!(result.unwrap_err().is_rate_limit());
    }

    #[tokio::test]
    async fn test_rejected_crumb_is_refreshed_once() {
        let server = MockServer::start().await;
        mock_crumb(&server, 2).await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let result = client(&server).search("apple", 5).await;
        assert!(matches!(result, Err(DataError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_search() {
        let server = MockServer::start().await;
        mock_crumb(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .and(query_param("q", "apple"))
            .and(query_param("quotesCount", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"quotes": [{"symbol": "AAPL", "shortname": "Apple Inc.", "exchange": "NMS"}]}"#,
            ))
            .mount(&server)
            .await;

        let yahoo = client(&server);
        let hits = yahoo.search(" apple ", 8).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, "AAPL");

        // Too short to search; no request is made
        assert!(yahoo.search("a", 8).await.unwrap().is_empty());
    }
}
