//! Integration tests for XBRL company facts parsing

use chrono::NaiveDate;
use comps_data::edgar::xbrl::{XbrlDocument, XbrlFact, concepts};

/// A foreign filer reporting under IFRS in yen, with a quarterly fact mixed in.
const IFRS_FACTS: &str = r#"{
    "cik": 1094517,
    "entityName": "Sony Group Corporation",
    "facts": {
        "dei": {
            "EntityCommonStockSharesOutstanding": {
                "units": {"shares": [
                    {"end": "2024-03-31", "val": 1230000000, "fy": 2023, "fp": "FY", "form": "20-F"}
                ]}
            }
        },
        "ifrs-full": {
            "Revenue": {
                "label": "Revenue",
                "units": {"JPY": [
                    {"start": "2022-04-01", "end": "2023-03-31", "val": 11539837000000, "fy": 2023, "fp": "FY", "form": "20-F"},
                    {"start": "2023-04-01", "end": "2024-03-31", "val": 13020768000000, "fy": 2023, "fp": "FY", "form": "20-F"},
                    {"start": "2023-04-01", "end": "2023-06-30", "val": 2961000000000, "fy": 2024, "fp": "Q1", "form": "6-K"}
                ]}
            },
            "ProfitLossAttributableToOwnersOfParent": {
                "units": {"JPY": [
                    {"start": "2023-04-01", "end": "2024-03-31", "val": 970573000000, "fy": 2023, "fp": "FY", "form": "20-F"}
                ]}
            },
            "ProfitLossFromOperatingActivities": {
                "units": {"JPY": [
                    {"start": "2023-04-01", "end": "2024-03-31", "val": 1208831000000, "fy": 2023, "fp": "FY", "form": "20-F"}
                ]}
            },
            "DepreciationAndAmortisationExpense": {
                "units": {"JPY": [
                    {"start": "2023-04-01", "end": "2024-03-31", "val": 1019000000000, "fy": 2023, "fp": "FY", "form": "20-F"}
                ]}
            }
        }
    }
}"#;

#[test]
fn test_ifrs_annual_values() {
    let doc = XbrlDocument::parse_json(IFRS_FACTS).unwrap();
    assert_eq!(doc.cik.as_deref(), Some("1094517"));

    // The 6-K quarter is tagged fy 2024 but is not an annual fact
    let fy = doc.latest_annual_fiscal_year().unwrap();
    assert_eq!(fy, 2023);

    let revenue = doc.annual_value(concepts::REVENUE, fy).unwrap();
    assert_eq!(revenue.value, 13_020_768_000_000.0);
    assert_eq!(revenue.unit, "JPY");
    assert_eq!(revenue.period_end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

    let net_income = doc.annual_value(concepts::NET_INCOME, fy).unwrap();
    assert_eq!(net_income.value, 970_573_000_000.0);

    let operating = doc.annual_value(concepts::OPERATING_INCOME, fy).unwrap();
    let dep_amort = doc.annual_value(concepts::DEPRECIATION_AMORTIZATION, fy).unwrap();
    assert_eq!(operating.value + dep_amort.value, 2_227_831_000_000.0);
}

#[test]
fn test_instant_facts_are_never_annual_values() {
    let doc = XbrlDocument::parse_json(IFRS_FACTS).unwrap();
    let shares = doc
        .facts
        .iter()
        .find(|f| f.concept == "dei:EntityCommonStockSharesOutstanding")
        .unwrap();
    assert!(shares.is_instant());
    assert!(shares.is_annual());
    assert!(
        doc.annual_value(&["dei:EntityCommonStockSharesOutstanding"], 2023)
            .is_none()
    );
}

#[test]
fn test_concept_order_is_preference_order() {
    let fact = |concept: &str, value: f64| XbrlFact {
        concept: concept.to_string(),
        value,
        unit: "USD".to_string(),
        period_end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        period_start: Some(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
        form: Some("10-K".to_string()),
        fiscal_year: Some(2023),
        fiscal_period: Some("FY".to_string()),
    };

    let mut doc = XbrlDocument::new();
    doc.facts.push(fact("us-gaap:ProfitLoss", 120.0));
    doc.facts.push(fact("us-gaap:NetIncomeLoss", 100.0));

    let net_income = doc.annual_value(concepts::NET_INCOME, 2023).unwrap();
    assert_eq!(net_income.concept, "us-gaap:NetIncomeLoss");
    assert_eq!(net_income.value, 100.0);
}
