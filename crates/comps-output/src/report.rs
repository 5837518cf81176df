//! The result of one comparable-company analysis run.

use crate::format;
use crate::summary::{MultipleStats, PeerSummary, generate_peer_summary};
use chrono::{DateTime, Utc};
use comps_data::Ticker;
use comps_valuation::{ComparableEntry, MultipleInfo, available_multiples};
use serde::{Deserialize, Serialize};

/// A company that produced no entry, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCompany {
    /// Company identifier
    pub ticker: String,
    /// Pipeline stage that failed (`fetch`, `extraction` or `valuation`)
    pub stage: String,
    /// Human-readable cause
    pub reason: String,
}

impl FailedCompany {
    /// Create a failure row.
    pub fn new(
        ticker: impl Into<String>,
        stage: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

/// Entries for the companies that succeeded, failures for the rest, and
/// statistics over the peers.
#[derive(Debug, Clone, Serialize)]
pub struct CompsReport {
    /// Company being valued
    pub target: Ticker,
    /// Report generation timestamp
    pub generated_at: DateTime<Utc>,
    /// One entry per successful company, in peer group order
    pub entries: Vec<ComparableEntry>,
    /// Companies that could not be valued
    pub failures: Vec<FailedCompany>,
    /// Statistics over the peers, excluding the target
    pub summary: PeerSummary,
}

impl CompsReport {
    /// Create a report and compute its peer summary.
    pub fn new(
        target: Ticker,
        entries: Vec<ComparableEntry>,
        failures: Vec<FailedCompany>,
    ) -> Self {
        let summary = generate_peer_summary(&entries, Some(&target));
        Self {
            target,
            generated_at: Utc::now(),
            entries,
            failures,
            summary,
        }
    }

    /// Number of companies attempted.
    pub fn company_count(&self) -> usize {
        self.entries.len() + self.failures.len()
    }

    /// The target's own entry, if it succeeded.
    pub fn target_entry(&self) -> Option<&ComparableEntry> {
        self.entries
            .iter()
            .find(|e| e.ticker.as_str().eq_ignore_ascii_case(self.target.as_str()))
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let multiples = available_multiples();
        let width = 8 + 6 + 3 * 15 + 11 + multiples.len() * 12 + 4;
        let mut output = String::new();

        output.push_str(&format!("\nComparable Companies: {}\n", self.target));
        output.push_str(&format!(
            "Generated: {} | {} of {} companies valued\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            self.entries.len(),
            self.company_count()
        ));
        output.push_str(&"=".repeat(width));
        output.push('\n');

        output.push_str(&format!(
            "{:<8} {:>5} {:>14} {:>14} {:>14} {:>10}",
            "Ticker", "FY", "Revenue ($M)", "Net Inc ($M)", "EBITDA ($M)", "Mkt Cap"
        ));
        for info in &multiples {
            output.push_str(&format!(" {:>11}", info.kind.to_string()));
        }
        output.push('\n');
        output.push_str(&"-".repeat(width));
        output.push('\n');

        for entry in &self.entries {
            output.push_str(&format!(
                "{:<8} {:>5} {:>14} {:>14} {:>14} {:>10}",
                entry.ticker.as_str(),
                entry.record.fiscal_year,
                format::millions(entry.record.revenue),
                format::millions(entry.record.net_income),
                format::millions(entry.record.ebitda),
                format::billions(entry.market_cap),
            ));
            for info in &multiples {
                output.push_str(&format!(
                    " {:>11}",
                    format::multiple(entry.multiple(info.kind), info.format)
                ));
            }
            output.push('\n');
        }

        output.push_str(&"-".repeat(width));
        output.push('\n');
        self.push_statistic_row(&mut output, "Peer Mean", &multiples, |s| s.mean);
        self.push_statistic_row(&mut output, "Peer Median", &multiples, |s| s.median);
        output.push_str(&"=".repeat(width));
        output.push('\n');

        if !self.failures.is_empty() {
            output.push_str(&format!("\nNot valued ({}):\n", self.failures.len()));
            for failure in &self.failures {
                output.push_str(&format!(
                    "  {:<8} [{}] {}\n",
                    failure.ticker, failure.stage, failure.reason
                ));
            }
        }

        output
    }

    fn push_statistic_row(
        &self,
        output: &mut String,
        label: &str,
        multiples: &[MultipleInfo],
        pick: impl Fn(&MultipleStats) -> Option<f64>,
    ) {
        output.push_str(&format!("{:<width$}", label, width = 8 + 6 + 3 * 15 + 11));
        for info in multiples {
            let value = self.summary.get(info.kind).and_then(&pick);
            output.push_str(&format!(" {:>11}", format::statistic(value, info.format)));
        }
        output.push('\n');
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let multiples = available_multiples();
        let mut output = String::new();

        output.push_str(&format!("# Comparable Companies: {}\n\n", self.target));
        output.push_str(&format!(
            "**Generated:** {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        output.push_str(
            "| Ticker | FY | Filing Date | Revenue (USD M) | Net Income (USD M) | EBITDA (USD M) | Market Cap |",
        );
        for info in &multiples {
            output.push_str(&format!(" {} |", info.kind));
        }
        output.push('\n');
        output.push_str("|--------|----|-------------|----------------:|-------------------:|---------------:|-----------:|");
        for _ in &multiples {
            output.push_str("---:|");
        }
        output.push('\n');

        for entry in &self.entries {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |",
                entry.ticker,
                entry.record.fiscal_year,
                entry
                    .record
                    .filing_date
                    .map_or_else(|| "-".to_string(), |d| d.to_string()),
                format::millions(entry.record.revenue),
                format::millions(entry.record.net_income),
                format::millions(entry.record.ebitda),
                format::billions(entry.market_cap),
            ));
            for info in &multiples {
                output.push_str(&format!(
                    " {} |",
                    format::multiple(entry.multiple(info.kind), info.format)
                ));
            }
            output.push('\n');
        }

        output.push_str("\n## Peer Summary\n\n");
        output.push_str("| Multiple | Mean | Median | Count |\n");
        output.push_str("|----------|-----:|-------:|------:|\n");
        for info in &multiples {
            if let Some(stats) = self.summary.get(info.kind) {
                output.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    info.kind,
                    format::statistic(stats.mean, info.format),
                    format::statistic(stats.median, info.format),
                    stats.count
                ));
            }
        }

        if !self.failures.is_empty() {
            output.push_str("\n## Not Valued\n\n");
            for failure in &self.failures {
                output.push_str(&format!(
                    "- **{}** ({}): {}\n",
                    failure.ticker, failure.stage, failure.reason
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comps_data::MarketSnapshot;
    use comps_valuation::{ExtractionSource, FinancialRecord};

    fn entry(ticker: &str, net_income: f64) -> ComparableEntry {
        let ticker = Ticker::parse(ticker).unwrap();
        let record = FinancialRecord {
            ticker: ticker.clone(),
            revenue: 391_035e6,
            net_income,
            ebitda: 134_661e6,
            currency: "USD".to_string(),
            fiscal_year: 2024,
            filing_date: chrono::NaiveDate::from_ymd_opt(2024, 11, 1),
            source: ExtractionSource::Xbrl,
        };
        let snapshot = MarketSnapshot::new(ticker, 225.0, 15.2e9).unwrap();
        ComparableEntry::compute(record, &snapshot).unwrap()
    }

    fn report() -> CompsReport {
        CompsReport::new(
            Ticker::parse("AAPL").unwrap(),
            vec![entry("AAPL", 93_736e6), entry("DELL", -1e6)],
            vec![FailedCompany::new("SONY", "extraction", "missing required field `revenue`")],
        )
    }

    #[test]
    fn test_report_counts() {
        let report = report();
        assert_eq!(report.company_count(), 3);
        assert_eq!(report.target_entry().unwrap().ticker.as_str(), "AAPL");
        assert_eq!(report.summary.peer_count, 1);
    }

    #[test]
    fn test_ascii_table() {
        let table = report().to_ascii_table();
        assert!(table.contains("Comparable Companies: AAPL"));
        assert!(table.contains("2 of 3 companies valued"));
        assert!(table.contains("391,035"));
        assert!(table.contains("$3420.00B"));
        assert!(table.contains("36.5x"));
        assert!(table.contains("N/A"));
        assert!(table.contains("Peer Median"));
        assert!(table.contains("SONY     [extraction] missing required field `revenue`"));
    }

    #[test]
    fn test_markdown() {
        let markdown = report().to_markdown();
        assert!(markdown.contains("# Comparable Companies: AAPL"));
        assert!(markdown.contains("| Ticker | FY |"));
        assert!(markdown.contains("| AAPL | 2024 | 2024-11-01 | 391,035 | 93,736 | 134,661 |"));
        assert!(markdown.contains("## Not Valued"));
    }

    #[test]
    fn test_json() {
        let json = serde_json::to_string_pretty(&report()).unwrap();
        assert!(json.contains("\"target\": \"AAPL\""));
        assert!(json.contains("\"pe\": null"));
        assert!(json.contains("\"stage\": \"extraction\""));
    }
}
