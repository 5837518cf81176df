//! Integration tests for report rendering, peer summary and export.

use chrono::NaiveDate;
use comps_data::{MarketSnapshot, Ticker};
use comps_output::{
    CompsReport, ExportFormat, Exporter, FailedCompany, default_filename, generate_peer_summary,
};
use comps_valuation::{ComparableEntry, ExtractionSource, FinancialRecord, MultipleKind};

fn entry(ticker: &str, revenue: f64, net_income: f64, price: f64) -> ComparableEntry {
    let ticker = Ticker::parse(ticker).unwrap();
    let record = FinancialRecord {
        ticker: ticker.clone(),
        revenue,
        net_income,
        ebitda: revenue * 0.3,
        currency: "USD".to_string(),
        fiscal_year: 2024,
        filing_date: NaiveDate::from_ymd_opt(2025, 2, 1),
        source: ExtractionSource::Xbrl,
    };
    let snapshot = MarketSnapshot::new(ticker, price, 1e9).unwrap();
    ComparableEntry::compute(record, &snapshot).unwrap()
}

fn e_commerce() -> CompsReport {
    CompsReport::new(
        Ticker::parse("AMZN").unwrap(),
        vec![
            entry("AMZN", 600e9, 50e9, 2000.0),
            entry("EBAY", 10e9, 2e9, 50.0),
            entry("ETSY", 3e9, 0.0, 6.0),
            entry("MELI", 20e9, 2e9, 100.0),
        ],
        vec![FailedCompany::new(
            "BABA",
            "fetch",
            "no 10-K or 20-F filing found for BABA",
        )],
    )
}

#[test]
fn test_full_report_workflow() {
    let report = e_commerce();

    assert_eq!(report.entries.len(), 4);
    assert_eq!(report.company_count(), 5);

    // EBAY 25x and MELI 50x; ETSY has no earnings and is skipped
    let pe = report.summary.get(MultipleKind::PriceToEarnings).unwrap();
    assert_eq!(pe.count, 2);
    assert_eq!(pe.median, Some(37.5));

    let ascii = report.to_ascii_table();
    assert!(ascii.contains("Comparable Companies: AMZN"));
    assert!(ascii.contains("600,000"));
    assert!(ascii.contains("$2000.00B"));
    assert!(ascii.contains("40.0x"));
    assert!(ascii.contains("BABA"));

    let markdown = report.to_markdown();
    assert!(markdown.contains("## Peer Summary"));
    assert!(markdown.contains("| P/E | 37.5x | 37.5x | 2 |"));
}

#[test]
fn test_entry_order_follows_input() {
    let report = e_commerce();
    let tickers: Vec<&str> = report.entries.iter().map(|e| e.ticker.as_str()).collect();
    assert_eq!(tickers, ["AMZN", "EBAY", "ETSY", "MELI"]);
}

#[test]
fn test_summary_is_order_independent() {
    let mut entries = e_commerce().entries;
    let target = Ticker::parse("AMZN").unwrap();
    let forward = generate_peer_summary(&entries, Some(&target));
    entries.reverse();
    let backward = generate_peer_summary(&entries, Some(&target));
    assert_eq!(forward, backward);
}

#[test]
fn test_csv_and_json_exports() {
    let report = e_commerce();

    let csv = report.export_to_string(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.lines().any(|l| l.starts_with("ETSY,") && l.contains(",,")));

    let json = report.export_to_string(ExportFormat::PrettyJson).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["entries"][2]["ticker"], "ETSY");
    assert!(value["entries"][2]["pe"].is_null());
    assert_eq!(value["failures"][0]["stage"], "fetch");

    let name = default_filename("amzn", NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(), ExportFormat::PrettyJson);
    assert_eq!(name, "comps_AMZN_20250309.json");
}
