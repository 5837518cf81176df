//! The per-company pipeline and the peer-group run.
//!
//! Each company goes through the same steps:
//!
//! 1. fetch its latest 10-K or 20-F
//! 2. build a [`FinancialRecord`] from XBRL company facts, or from the filing
//!    text through the language model when the facts are incomplete
//! 3. restate the record and the market snapshot in USD
//! 4. compute the multiples
//!
//! A company that fails any step is recorded as a [`CompanyError`] and the run
//! moves on. Rate-limited steps are retried after a backoff.

use crate::config::CompsConfig;
use crate::error::{CompanyError, CompsError, Result};
use crate::peers::PeerGroup;
use comps_data::{
    DataError, FilingSource, LanguageModel, MarketDataSource, MarketQuote, MarketSnapshot, Ticker,
};
use comps_output::{CompsReport, FailedCompany};
use comps_valuation::{
    ComparableEntry, FinancialRecord, StructuredExtractor, ValuationError, record_from_facts,
};
use futures::{StreamExt, stream};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pacing and retry settings for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Companies valued at once
    pub concurrency: usize,
    /// Pause before each company after the first
    pub company_delay: Duration,
    /// Wait after a rate-limit response
    pub rate_limit_backoff: Duration,
    /// Attempts per company when rate limited
    pub max_attempts: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&CompsConfig::default())
    }
}

impl From<&CompsConfig> for PipelineOptions {
    fn from(config: &CompsConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            company_delay: config.company_delay(),
            rate_limit_backoff: config.rate_limit_backoff(),
            max_attempts: config.max_attempts.max(1),
        }
    }
}

impl PipelineOptions {
    /// No pauses and a single attempt.
    pub const fn immediate() -> Self {
        Self {
            concurrency: 1,
            company_delay: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
            max_attempts: 1,
        }
    }
}

/// Outcome of one run: entries in peer-group order plus the companies skipped.
#[derive(Debug)]
pub struct PipelineReport {
    /// The company being valued
    pub target: Ticker,
    /// Valued companies, target first when it succeeded
    pub entries: Vec<ComparableEntry>,
    /// Companies that produced no entry
    pub failures: Vec<CompanyError>,
}

impl PipelineReport {
    /// Whether the target itself was valued.
    pub fn has_target(&self) -> bool {
        self.entries.iter().any(|e| e.ticker == self.target)
    }

    /// Convert into the renderable report, computing the peer summary.
    pub fn into_report(self) -> CompsReport {
        let failures = self
            .failures
            .iter()
            .map(|err| FailedCompany::new(err.ticker().as_str(), err.stage(), err.reason()))
            .collect();
        CompsReport::new(self.target, self.entries, failures)
    }
}

/// Values a peer group against filings, market data and a language model.
#[derive(Debug)]
pub struct CompsPipeline<F, M, L> {
    filings: F,
    market: M,
    extractor: StructuredExtractor<L>,
    options: PipelineOptions,
}

impl<F, M, L> CompsPipeline<F, M, L>
where
    F: FilingSource + Sync,
    M: MarketDataSource + Sync,
    L: LanguageModel + Sync,
{
    /// Assemble a pipeline.
    pub const fn new(
        filings: F,
        market: M,
        extractor: StructuredExtractor<L>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            filings,
            market,
            extractor,
            options,
        }
    }

    /// The filing source.
    pub const fn filings(&self) -> &F {
        &self.filings
    }

    /// The market data source.
    pub const fn market(&self) -> &M {
        &self.market
    }

    /// The language-model extractor used when XBRL facts fall short.
    pub const fn extractor(&self) -> &StructuredExtractor<L> {
        &self.extractor
    }

    /// Pacing and retry settings.
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Value every company of `group`.
    ///
    /// # Errors
    /// Returns [`CompsError::EmptyPeerGroup`] when the group has no peers.
    /// Company failures are reported in [`PipelineReport::failures`].
    pub async fn run(&self, group: &PeerGroup) -> Result<PipelineReport> {
        self.run_with(group, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_done` as each company finishes.
    ///
    /// # Errors
    /// Returns [`CompsError::EmptyPeerGroup`] when the group has no peers.
    pub async fn run_with(
        &self,
        group: &PeerGroup,
        mut on_done: impl FnMut(&Ticker, std::result::Result<&ComparableEntry, &CompanyError>),
    ) -> Result<PipelineReport> {
        if !group.has_peers() {
            return Err(CompsError::EmptyPeerGroup(group.target().clone()));
        }

        info!(
            ticker = %group.target(),
            peers = group.peers().len(),
            concurrency = self.options.concurrency,
            "starting comps run"
        );

        let delay = self.options.company_delay;
        let results: Vec<_> = stream::iter(group.tickers().iter().enumerate())
            .map(|(index, ticker)| async move {
                if index > 0 && !delay.is_zero() {
                    debug!(%ticker, delay_secs = delay.as_secs_f64(), "pausing before company");
                    tokio::time::sleep(delay).await;
                }
                (ticker, self.value_company(ticker).await)
            })
            .buffered(self.options.concurrency.max(1))
            .inspect(|(ticker, result)| on_done(*ticker, result.as_ref()))
            .collect()
            .await;

        let mut entries = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (ticker, result) in results {
            match result {
                Ok(entry) => {
                    info!(
                        %ticker,
                        source = %entry.record.source,
                        fiscal_year = entry.record.fiscal_year,
                        "company valued"
                    );
                    entries.push(entry);
                }
                Err(err) => {
                    warn!(%ticker, stage = err.stage(), error = %err.reason(), "company skipped");
                    failures.push(err);
                }
            }
        }

        info!(
            ticker = %group.target(),
            valued = entries.len(),
            skipped = failures.len(),
            "comps run finished"
        );

        Ok(PipelineReport {
            target: group.target().clone(),
            entries,
            failures,
        })
    }

    /// Value one company, retrying rate-limited attempts.
    ///
    /// # Errors
    /// Returns the [`CompanyError`] of the last attempt.
    pub async fn value_company(
        &self,
        ticker: &Ticker,
    ) -> std::result::Result<ComparableEntry, CompanyError> {
        self.with_retry(ticker, move || self.value_once(ticker))
            .await
    }

    /// Build only the financial record of one company, retrying rate limits.
    ///
    /// # Errors
    /// Returns the [`CompanyError`] of the last attempt.
    pub async fn extract_one(
        &self,
        ticker: &Ticker,
    ) -> std::result::Result<FinancialRecord, CompanyError> {
        self.with_retry(ticker, move || self.financial_record(ticker))
            .await
    }

    async fn with_retry<T, Fut>(
        &self,
        ticker: &Ticker,
        mut attempt_once: impl FnMut() -> Fut,
    ) -> std::result::Result<T, CompanyError>
    where
        Fut: Future<Output = std::result::Result<T, CompanyError>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_once().await {
                Err(err) if err.is_rate_limit() && attempt < self.options.max_attempts => {
                    warn!(
                        %ticker,
                        attempt,
                        backoff_secs = self.options.rate_limit_backoff.as_secs_f64(),
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(self.options.rate_limit_backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn value_once(
        &self,
        ticker: &Ticker,
    ) -> std::result::Result<ComparableEntry, CompanyError> {
        let fetch = |source: DataError| CompanyError::Fetch {
            ticker: ticker.clone(),
            source,
        };
        let valuation = |source: ValuationError| CompanyError::Valuation {
            ticker: ticker.clone(),
            source,
        };

        let mut record = self.financial_record(ticker).await?;
        if !record.is_usd() {
            let rate = self.market.usd_rate(&record.currency).await.map_err(fetch)?;
            debug!(%ticker, currency = %record.currency, rate, "restating record in USD");
            record = record.to_usd(rate).map_err(valuation)?;
        }

        let MarketQuote { snapshot, profile } = self.market.quote(ticker).await.map_err(fetch)?;
        let snapshot = self.usd_snapshot(ticker, snapshot).await.map_err(fetch)?;

        ComparableEntry::compute(record, &snapshot)
            .map(|entry| entry.with_name(profile.name))
            .map_err(valuation)
    }

    async fn usd_snapshot(
        &self,
        ticker: &Ticker,
        snapshot: MarketSnapshot,
    ) -> comps_data::Result<MarketSnapshot> {
        if snapshot.is_usd() {
            return Ok(snapshot);
        }
        let rate = self.market.usd_rate(&snapshot.currency).await?;
        debug!(%ticker, currency = %snapshot.currency, rate, "restating quote in USD");
        snapshot.to_usd(rate)
    }

    async fn financial_record(
        &self,
        ticker: &Ticker,
    ) -> std::result::Result<FinancialRecord, CompanyError> {
        let fetch = |source: DataError| CompanyError::Fetch {
            ticker: ticker.clone(),
            source,
        };

        let filing = self
            .filings
            .latest_annual_filing(ticker)
            .await
            .map_err(fetch)?;
        debug!(
            %ticker,
            form = filing.form.as_str(),
            accession = %filing.accession_number,
            "latest annual filing"
        );

        match self.filings.company_facts(&filing.cik).await {
            Ok(facts) => {
                if let Some(record) = record_from_facts(ticker, &facts, Some(filing.filing_date)) {
                    return Ok(record);
                }
            }
            Err(err) if err.is_rate_limit() => return Err(fetch(err)),
            Err(err) => {
                warn!(%ticker, error = %err, "company facts unavailable, reading filing text");
            }
        }

        self.extractor
            .extract(&filing)
            .await
            .map_err(|source| CompanyError::Extraction {
                ticker: ticker.clone(),
                source,
            })
    }
}
