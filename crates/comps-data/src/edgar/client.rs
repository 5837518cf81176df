//! SEC EDGAR API client with rate limiting.

use super::document::FilingDocument;
use super::filings::{CikLookup, CompanyFilings, FilingInfo};
use super::xbrl::XbrlDocument;
use crate::error::{DataError, Result};
use crate::source::FilingSource;
use crate::ticker::Ticker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Host of the ticker table and filing archives
const WWW_BASE_URL: &str = "https://www.sec.gov";

/// Host of the submissions and XBRL APIs
const DATA_BASE_URL: &str = "https://data.sec.gov";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Backoff assumed when SEC answers 429 without a Retry-After header
const DEFAULT_RETRY_AFTER_MS: u64 = 10_000;

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// SEC EDGAR API client with rate limiting.
///
/// The ticker table is downloaded once per client and reused for every lookup.
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    www_base: String,
    data_base: String,
    cik_lookup: OnceCell<CikLookup>,
}

impl EdgarClient {
    /// Create a new EDGAR client with default settings (10 req/sec).
    ///
    /// `identity` is sent as the User-Agent, which SEC requires to name the
    /// requester and a contact email, e.g. `"Jane Analyst jane@example.com"`.
    pub fn new(identity: &str) -> Result<Self> {
        Self::with_rate_limit(identity, DEFAULT_RATE_LIMIT)
    }

    /// Create a new EDGAR client with custom rate limit
    ///
    /// # Arguments
    /// * `identity` - User-Agent identity (name and email)
    /// * `min_interval` - Minimum duration between requests
    ///
    /// # Example
    /// ```no_run
    /// use comps_data::edgar::EdgarClient;
    /// use std::time::Duration;
    ///
    /// # fn example() -> comps_data::Result<()> {
    /// // 5 requests per second
    /// let client = EdgarClient::with_rate_limit(
    ///     "Jane Analyst jane@example.com",
    ///     Duration::from_millis(200),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_rate_limit(identity: &str, min_interval: Duration) -> Result<Self> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(DataError::EdgarApi(
                "a User-Agent identity (name and email) is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(identity)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            www_base: WWW_BASE_URL.to_string(),
            data_base: DATA_BASE_URL.to_string(),
            cik_lookup: OnceCell::new(),
        })
    }

    /// Point the client at different hosts, e.g. a local mock server.
    pub fn with_base_urls(mut self, www_base: impl Into<String>, data_base: impl Into<String>) -> Self {
        self.www_base = www_base.into().trim_end_matches('/').to_string();
        self.data_base = data_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, url: &str, context: &str) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;
        debug!(url, "EDGAR request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after_ms = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(DEFAULT_RETRY_AFTER_MS, |secs| secs.saturating_mul(1000));
        Err(DataError::from_status(status, retry_after_ms, context))
    }

    async fn cik_lookup(&self) -> Result<&CikLookup> {
        self.cik_lookup
            .get_or_try_init(|| async {
                let url = format!("{}/files/company_tickers.json", self.www_base);
                let body = self.get(&url, "company tickers").await?.text().await?;
                let lookup = CikLookup::from_json(&body)?;
                debug!(tickers = lookup.len(), "loaded SEC ticker table");
                Ok::<_, DataError>(lookup)
            })
            .await
    }

    /// Look up a company's CIK number from its ticker symbol
    ///
    /// A numeric identifier is taken to already be a CIK.
    ///
    /// # Returns
    /// The company's CIK number as a zero-padded 10-digit string
    ///
    /// # Errors
    /// Returns `DataError::CikNotFound` if the ticker is not found
    pub async fn get_company_cik(&self, ticker: &Ticker) -> Result<String> {
        if ticker.is_cik() {
            return Ok(CikLookup::pad_cik(ticker.as_str()));
        }

        self.cik_lookup()
            .await?
            .get_cik(ticker.as_str())
            .map(|(cik, _)| CikLookup::pad_cik(cik))
            .ok_or_else(|| DataError::CikNotFound(ticker.to_string()))
    }

    /// Get company filings metadata
    ///
    /// # Arguments
    /// * `cik` - Company's CIK number (can be with or without padding)
    pub async fn get_company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        if cik.is_empty() {
            return Err(DataError::InvalidSymbol("Empty CIK".to_string()));
        }

        let url = format!(
            "{}/submissions/CIK{}.json",
            self.data_base,
            CikLookup::pad_cik(cik)
        );
        let body = self.get(&url, "company submissions").await?.text().await?;
        CompanyFilings::from_json(&body)
    }

    /// Fetch the primary document of a filing as raw HTML.
    pub async fn get_filing_document(&self, cik: &str, filing: &FilingInfo) -> Result<String> {
        let url = format!("{}/{}", self.www_base, filing.document_path(cik));
        let content = self.get(&url, "filing document").await?.text().await?;
        Ok(content)
    }

    /// Fetch every XBRL fact the company has reported.
    pub async fn fetch_company_facts(&self, cik: &str) -> Result<XbrlDocument> {
        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            self.data_base,
            CikLookup::pad_cik(cik)
        );
        let body = self.get(&url, "company facts").await?.text().await?;
        XbrlDocument::parse_json(&body)
    }

    /// Fetch the latest 10-K or 20-F for a company.
    ///
    /// # Example
    /// ```no_run
    /// use comps_data::{EdgarClient, Ticker};
    ///
    /// # async fn example() -> comps_data::Result<()> {
    /// let client = EdgarClient::new("Jane Analyst jane@example.com")?;
    /// let filing = client.fetch_latest_annual(&Ticker::parse("AAPL")?).await?;
    /// println!("{} filed {}", filing.form, filing.filing_date);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_latest_annual(&self, ticker: &Ticker) -> Result<FilingDocument> {
        let cik = self.get_company_cik(ticker).await?;
        let filings = self.get_company_filings(&cik).await?;
        let filing = filings.latest_annual().ok_or_else(|| {
            DataError::FilingNotFound(format!("no 10-K or 20-F on file for {ticker}"))
        })?;

        debug!(
            %ticker,
            form = %filing.form,
            accession = %filing.accession_number,
            "found annual filing"
        );

        let content = self.get_filing_document(&cik, &filing).await?;
        Ok(FilingDocument {
            ticker: ticker.clone(),
            cik: cik.trim_start_matches('0').to_string(),
            form: filing.form,
            accession_number: filing.accession_number,
            filing_date: filing.filing_date,
            report_date: filing.report_date,
            content,
        })
    }
}

impl FilingSource for EdgarClient {
    async fn latest_annual_filing(&self, ticker: &Ticker) -> Result<FilingDocument> {
        self.fetch_latest_annual(ticker).await
    }

    async fn company_facts(&self, cik: &str) -> Result<XbrlDocument> {
        self.fetch_company_facts(cik).await
    }
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient")
            .field("www_base", &self.www_base)
            .field("data_base", &self.data_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::FilingForm;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TICKERS: &str = r#"{
        "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
        "1": {"cik_str": 1094517, "ticker": "SONY", "title": "Sony Group Corp"}
    }"#;

    const SUBMISSIONS: &str = r#"{
        "cik": "320193",
        "name": "Apple Inc.",
        "filings": {"recent": {
            "accessionNumber": ["0000320193-24-000081", "0000320193-24-000123"],
            "filingDate": ["2024-08-02", "2024-11-01"],
            "reportDate": ["2024-06-29", "2024-09-28"],
            "form": ["10-Q", "10-K"],
            "primaryDocument": ["aapl-20240629.htm", "aapl-20240928.htm"]
        }}
    }"#;

    fn client(server: &MockServer) -> EdgarClient {
        EdgarClient::with_rate_limit("Test Suite test@example.com", Duration::from_millis(1))
            .unwrap()
            .with_base_urls(server.uri(), server.uri())
    }

    #[test]
    fn test_identity_required() {
        assert!(matches!(
            EdgarClient::new("  "),
            Err(DataError::EdgarApi(_))
        ));
    }

    #[tokio::test]
    async fn test_cik_lookup_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/company_tickers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TICKERS))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let aapl = client.get_company_cik(&Ticker::parse("aapl").unwrap()).await.unwrap();
        let sony = client.get_company_cik(&Ticker::parse("SONY").unwrap()).await.unwrap();
        assert_eq!(aapl, "0000320193");
        assert_eq!(sony, "0001094517");

        let missing = client.get_company_cik(&Ticker::parse("NOPE").unwrap()).await;
        assert!(matches!(missing, Err(DataError::CikNotFound(_))));
    }

    #[tokio::test]
    async fn test_numeric_identifier_is_cik() {
        let server = MockServer::start().await;
        let client = client(&server);
        let cik = client.get_company_cik(&Ticker::parse("320193").unwrap()).await.unwrap();
        assert_eq!(cik, "0000320193");
    }

    #[tokio::test]
    async fn test_fetch_latest_annual() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/company_tickers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TICKERS))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/submissions/CIK0000320193.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUBMISSIONS))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Archives/edgar/data/320193/000032019324000123/aapl-20240928.htm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>10-K</html>"))
            .mount(&server)
            .await;

        let client = client(&server);
        let doc = client
            .latest_annual_filing(&Ticker::parse("AAPL").unwrap())
            .await
            .unwrap();

        assert_eq!(doc.cik, "320193");
        assert_eq!(doc.form, FilingForm::TenK);
        assert_eq!(doc.accession_number, "0000320193-24-000123");
        assert_eq!(doc.content, "<html>10-K</html>");
        assert_eq!(doc.filing_year(), 2024);
    }

    #[tokio::test]
    async fn test_no_annual_filing() {
        let server = MockServer::start().await;
        let quarterly_only = SUBMISSIONS.replace("\"10-K\"", "\"8-K\"");
        Mock::given(method("GET"))
            .and(path("/submissions/CIK0000320193.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(quarterly_only))
            .mount(&server)
            .await;

        let client = client(&server);
        let result = client
            .fetch_latest_annual(&Ticker::parse("320193").unwrap())
            .await;
        assert!(matches!(result, Err(DataError::FilingNotFound(_))));
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/xbrl/companyfacts/CIK0000320193.json"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
            .mount(&server)
            .await;

        let client = client(&server);
        let result = client.company_facts("320193").await;
        assert!(matches!(
            result,
            Err(DataError::RateLimit {
                retry_after_ms: 3000
            })
        ));
    }

    #[tokio::test]
    async fn test_oversized_retry_after_saturates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/company_tickers.json"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("Retry-After", u64::MAX.to_string().as_str()),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let result = client.get_company_cik(&Ticker::parse("AAPL").unwrap()).await;
        assert!(matches!(
            result,
            Err(DataError::RateLimit {
                retry_after_ms: u64::MAX
            })
        ));
    }

    #[tokio::test]
    async fn test_rate_limiting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client =
            EdgarClient::with_rate_limit("Test Suite test@example.com", Duration::from_millis(100))
                .unwrap()
                .with_base_urls(server.uri(), server.uri());

        let start = Instant::now();
        for cik in ["1", "2", "3"] {
            let result = client.get_company_filings(cik).await;
            assert!(matches!(result, Err(DataError::Http(_))));
        }

        // Two intervals between three requests
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
