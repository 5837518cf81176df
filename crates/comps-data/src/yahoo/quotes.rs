//! Foreign exchange rates from Yahoo Finance quote history.

use crate::error::{DataError, Result};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Days of history fetched; covers weekends and market holidays.
const LOOKBACK_DAYS: i64 = 5;

/// The Yahoo symbol quoting a currency against USD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FxPair {
    /// Yahoo symbol, e.g. `EURUSD=X`
    pub symbol: String,
    /// Whether the pair quotes units of the currency per USD (`USDJPY=X`)
    pub inverted: bool,
}

impl FxPair {
    /// The pair used to convert `currency` into USD.
    ///
    /// Yahoo's `JPYUSD=X` is too coarse to be useful, so yen is read from
    /// `USDJPY=X` and inverted.
    pub fn for_currency(currency: &str) -> Self {
        let currency = currency.to_uppercase();
        if currency == "JPY" {
            Self {
                symbol: "USDJPY=X".to_string(),
                inverted: true,
            }
        } else {
            Self {
                symbol: format!("{currency}USD=X"),
                inverted: false,
            }
        }
    }

    /// USD per one unit of the currency given the pair's closing price.
    pub fn usd_per_unit(&self, close: f64) -> Option<f64> {
        let rate = if self.inverted { 1.0 / close } else { close };
        (rate.is_finite() && rate > 0.0).then_some(rate)
    }
}

/// Validate and uppercase an ISO-4217 code.
///
/// # Errors
/// Returns [`DataError::InvalidSymbol`] unless the code is three ASCII letters.
pub fn normalize_currency(currency: &str) -> Result<String> {
    let code = currency.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(DataError::InvalidSymbol(format!(
            "not an ISO-4217 currency code: {currency:?}"
        )))
    }
}

/// FX rate lookups through the `yahoo_finance_api` connector.
pub(crate) struct FxRates {
    provider: yahoo::YahooConnector,
}

impl std::fmt::Debug for FxRates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FxRates").finish_non_exhaustive()
    }
}

impl FxRates {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
        })
    }

    /// USD per one unit of `currency`, from the latest close over the last few days.
    pub(crate) async fn usd_rate(&self, currency: &str) -> Result<f64> {
        let currency = normalize_currency(currency)?;
        if currency == "USD" {
            return Ok(1.0);
        }

        let pair = FxPair::for_currency(&currency);
        let end = OffsetDateTime::now_utc();
        let start = end - time::Duration::days(LOOKBACK_DAYS);

        let response = self
            .provider
            .get_quote_history(&pair.symbol, start, end)
            .await?;
        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        let close = quotes
            .iter()
            .rev()
            .map(|q| q.close)
            .find(|c| c.is_finite() && *c > 0.0)
            .ok_or_else(|| DataError::MissingData {
                symbol: pair.symbol.clone(),
                reason: format!("no closing price in the last {LOOKBACK_DAYS} days"),
            })?;

        let rate = pair.usd_per_unit(close).ok_or_else(|| DataError::MissingData {
            symbol: pair.symbol.clone(),
            reason: format!("unusable close {close}"),
        })?;
        debug!(%currency, pair = %pair.symbol, rate, "FX rate");
        Ok(rate)
    }
}
