//! Peer groups.
//!
//! A run values a target company next to a handful of peers. Peers come from
//! the user or, failing that, from a curated per-industry list.

pub mod industry;

pub use industry::Industry;

use comps_data::{DataError, Ticker};
use serde::Serialize;

/// Suggested when the target's industry has no curated list.
pub const FALLBACK_PEERS: [&str; 3] = ["MSFT", "GOOGL", "AMZN"];

/// Large caps offered in addition to the suggestions.
pub const EXTRA_OPTIONS: [&str; 6] = ["META", "TSLA", "NFLX", "NVDA", "AMD", "INTC"];

/// Peers selected by default from the suggestions.
pub const DEFAULT_SELECTION: usize = 3;

/// Suggested peers for a target, excluding the target itself.
pub fn suggested_peers(industry: Option<&str>, target: &Ticker) -> Vec<Ticker> {
    let curated = industry
        .and_then(Industry::from_name)
        .map_or(&FALLBACK_PEERS[..], |i| i.peers());

    curated
        .iter()
        .filter(|s| !s.eq_ignore_ascii_case(target.as_str()))
        .filter_map(|s| Ticker::parse(s).ok())
        .collect()
}

/// Suggestions followed by the extra options, without duplicates.
pub fn peer_options(industry: Option<&str>, target: &Ticker) -> Vec<Ticker> {
    let extras = EXTRA_OPTIONS.iter().filter_map(|s| Ticker::parse(s).ok());
    let mut options: Vec<Ticker> = Vec::new();
    for ticker in suggested_peers(industry, target).into_iter().chain(extras) {
        if ticker != *target && !options.contains(&ticker) {
            options.push(ticker);
        }
    }
    options
}

/// The peers selected when the user names none.
pub fn default_peers(industry: Option<&str>, target: &Ticker) -> Vec<Ticker> {
    let mut peers = suggested_peers(industry, target);
    peers.truncate(DEFAULT_SELECTION);
    peers
}

/// The ordered companies of one run: the target first, then its peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerGroup {
    tickers: Vec<Ticker>,
}

impl PeerGroup {
    /// Build a group, dropping repeats of the target or of an earlier peer.
    pub fn new(target: Ticker, peers: impl IntoIterator<Item = Ticker>) -> Self {
        let mut tickers = vec![target];
        for peer in peers {
            if !tickers.contains(&peer) {
                tickers.push(peer);
            }
        }
        Self { tickers }
    }

    /// Parse and build a group from raw symbols.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidSymbol`] for the first malformed symbol.
    pub fn parse<S: AsRef<str>>(target: &str, peers: &[S]) -> Result<Self, DataError> {
        let target = Ticker::parse(target)?;
        let peers = peers
            .iter()
            .map(|p| Ticker::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(target, peers))
    }

    /// The company being valued.
    pub fn target(&self) -> &Ticker {
        &self.tickers[0]
    }

    /// The comparables, in order.
    pub fn peers(&self) -> &[Ticker] {
        &self.tickers[1..]
    }

    /// Target followed by peers.
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Number of companies, target included.
    pub const fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Always false: a group has at least its target.
    pub const fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Whether the group has any company besides the target.
    pub const fn has_peers(&self) -> bool {
        self.tickers.len() > 1
    }
}
