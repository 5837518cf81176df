//! Peer group statistics.
//!
//! Each multiple is summarized over the peers for which it is applicable.
//! Not-applicable multiples are skipped rather than counted as zero, so a
//! loss-making peer does not drag the P/E median down.

use comps_data::Ticker;
use comps_valuation::{ComparableEntry, MultipleKind, available_multiples};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution of one multiple across the peer group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleStats {
    /// Identifier of the multiple summarized (e.g. `"pe"`)
    pub name: String,
    /// Number of peers with an applicable value
    pub count: usize,
    /// Arithmetic mean
    pub mean: Option<f64>,
    /// Median; the average of the middle pair for an even count
    pub median: Option<f64>,
    /// Smallest value
    pub min: Option<f64>,
    /// Largest value
    pub max: Option<f64>,
}

impl MultipleStats {
    /// Summarize a set of values.
    ///
    /// # Examples
    ///
    /// ```
    /// use comps_output::MultipleStats;
    ///
    /// let stats = MultipleStats::from_values("pe", vec![30.0, 10.0, 20.0, 50.0]);
    /// assert_eq!(stats.count, 4);
    /// assert_eq!(stats.mean, Some(27.5));
    /// assert_eq!(stats.median, Some(25.0));
    /// ```
    pub fn from_values(name: &str, mut values: Vec<f64>) -> Self {
        values.retain(|v| v.is_finite());
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let median = match count {
            0 => None,
            n if n % 2 == 1 => Some(values[n / 2]),
            n => Some((values[n / 2 - 1] + values[n / 2]) / 2.0),
        };

        Self {
            name: name.to_string(),
            count,
            mean,
            median,
            min: values.first().copied(),
            max: values.last().copied(),
        }
    }
}

/// Statistics for every registered multiple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerSummary {
    /// Number of peers summarized
    pub peer_count: usize,
    /// One entry per multiple, in registry order
    pub multiples: Vec<MultipleStats>,
}

impl PeerSummary {
    /// Statistics for one multiple.
    pub fn get(&self, kind: MultipleKind) -> Option<&MultipleStats> {
        let name = comps_valuation::get_multiple_info(kind)?.name;
        self.multiples.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for PeerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Peer summary ({} peers):", self.peer_count)?;
        for stats in &self.multiples {
            match (stats.mean, stats.median) {
                (Some(mean), Some(median)) => writeln!(
                    f,
                    "  {}: mean {mean:.2}, median {median:.2} (n={})",
                    stats.name, stats.count
                )?,
                _ => writeln!(f, "  {}: no applicable values", stats.name)?,
            }
        }
        Ok(())
    }
}

/// Summarize the peers of `target`.
///
/// The target itself is excluded so its multiples can be compared against the
/// peer statistics. With no target every entry counts as a peer.
pub fn generate_peer_summary(entries: &[ComparableEntry], target: Option<&Ticker>) -> PeerSummary {
    let peers: Vec<&ComparableEntry> = entries
        .iter()
        .filter(|e| target.is_none_or(|t| !e.ticker.as_str().eq_ignore_ascii_case(t.as_str())))
        .collect();

    let multiples = available_multiples()
        .into_iter()
        .map(|info| {
            let values = peers
                .iter()
                .filter_map(|e| e.multiple(info.kind).value())
                .collect();
            MultipleStats::from_values(info.name, values)
        })
        .collect();

    PeerSummary {
        peer_count: peers.len(),
        multiples,
    }
}
