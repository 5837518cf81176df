//! Strict validation of language model responses.
//!
//! Responses are accepted only when every required field is a JSON number.
//! Anything else (strings such as `"1,000"`, `null`, booleans or a missing key)
//! is rejected with an [`ExtractionError`] naming the field.

use crate::error::ExtractionError;
use serde_json::{Map, Value};

/// Magnitude above which a value is taken to be in units rather than millions.
const UNITS_THRESHOLD: f64 = 1e8;

/// Accepted fiscal years.
const FISCAL_YEARS: std::ops::RangeInclusive<i64> = 1990..=2100;

/// Figures read from a model response, in millions of `reporting_currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFigures {
    /// Revenue in millions
    pub revenue: f64,
    /// Net income in millions
    pub net_income: f64,
    /// EBITDA in millions
    pub ebitda: f64,
    /// ISO-4217 code, `USD` when the response omits it
    pub reporting_currency: String,
    /// Fiscal year, when the response states one
    pub fiscal_year: Option<i32>,
}

/// One data column of a financial table and the fiscal year it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnYear {
    /// Header text as printed in the table
    pub header: String,
    /// Fiscal year of the column
    pub year: i32,
}

/// Slice out the outermost JSON object, ignoring markdown fences and prose.
///
/// # Errors
/// Returns [`ExtractionError::NoJsonObject`] if the text has no `{...}` span.
pub fn locate_json(text: &str) -> Result<&str, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ExtractionError::NoJsonObject)?;
    if end < start {
        return Err(ExtractionError::NoJsonObject);
    }
    Ok(&text[start..=end])
}

fn parse_object(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    let json = locate_json(text)?;
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractionError::NoJsonObject),
        Err(e) => Err(ExtractionError::MalformedJson(e.to_string())),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn require_number(map: &Map<String, Value>, field: &'static str) -> Result<f64, ExtractionError> {
    match map.get(field) {
        None => Err(ExtractionError::MissingField { field }),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(ExtractionError::NotANumber {
                field,
                found: "non-finite number",
            }),
        Some(other) => Err(ExtractionError::NotANumber {
            field,
            found: type_name(other),
        }),
    }
}

/// An optional field: absent and `null` both mean "not stated".
fn optional<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn parse_year(value: &Value) -> Option<i32> {
    let year = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })?;
    FISCAL_YEARS
        .contains(&year)
        .then(|| i32::try_from(year).ok())
        .flatten()
}

/// Scale a model-reported amount to millions.
///
/// Models are asked for millions but sometimes answer in units
/// (e.g. `96773000000`); anything above 1e8 in magnitude is divided by 1e6.
pub fn to_millions(value: f64) -> f64 {
    if value.abs() > UNITS_THRESHOLD {
        value / 1e6
    } else {
        value
    }
}

/// Validate an extraction response.
///
/// Requires `revenue` and `net_income`, and either `ebitda` or both
/// `operating_income` and `dep_amort`. Amounts are normalized with
/// [`to_millions`].
///
/// # Errors
/// Fails closed with an [`ExtractionError`] naming the offending field.
pub fn parse_figures(text: &str) -> Result<ExtractedFigures, ExtractionError> {
    let map = parse_object(text)?;

    let revenue = require_number(&map, "revenue")?;
    let net_income = require_number(&map, "net_income")?;
    let ebitda = if map.contains_key("ebitda") {
        to_millions(require_number(&map, "ebitda")?)
    } else {
        to_millions(require_number(&map, "operating_income")?)
            + to_millions(require_number(&map, "dep_amort")?)
    };

    let reporting_currency = match optional(&map, "reporting_currency") {
        None => "USD".to_string(),
        Some(Value::String(code))
            if code.trim().len() == 3 && code.trim().chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            code.trim().to_ascii_uppercase()
        }
        Some(other) => return Err(ExtractionError::InvalidCurrency(other.to_string())),
    };

    let fiscal_year = match optional(&map, "fiscal_year") {
        None => None,
        Some(value) => Some(
            parse_year(value).ok_or_else(|| ExtractionError::InvalidFiscalYear(value.to_string()))?,
        ),
    };

    Ok(ExtractedFigures {
        revenue: to_millions(revenue),
        net_income: to_millions(net_income),
        ebitda,
        reporting_currency,
        fiscal_year,
    })
}

/// Validate a column listing response: `{"columns": [{"header": ..., "year": ...}]}`.
///
/// Entries without a valid year are skipped. A dated entry without a header
/// rejects the whole listing, since the follow-up prompt names its column by
/// header.
///
/// # Errors
/// Returns [`ExtractionError::NoColumns`] if no entry carries a valid year and
/// [`ExtractionError::MissingField`] for a dated entry with a blank header.
pub fn parse_columns(text: &str) -> Result<Vec<ColumnYear>, ExtractionError> {
    let map = parse_object(text)?;
    let columns = match map.get("columns") {
        None => return Err(ExtractionError::MissingField { field: "columns" }),
        Some(Value::Array(columns)) => columns,
        Some(other) => {
            return Err(ExtractionError::MalformedJson(format!(
                "`columns` must be an array, found {}",
                type_name(other)
            )));
        }
    };

    let mut parsed = Vec::with_capacity(columns.len());
    for column in columns {
        let Some(year) = column.get("year").and_then(parse_year) else {
            continue;
        };
        let header = column
            .get("header")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ExtractionError::MissingField { field: "header" })?;
        parsed.push(ColumnYear {
            header: header.to_string(),
            year,
        });
    }

    if parsed.is_empty() {
        return Err(ExtractionError::NoColumns);
    }
    Ok(parsed)
}

/// The column covering the latest fiscal year; the rightmost one on ties.
pub fn latest_column(columns: &[ColumnYear]) -> Option<&ColumnYear> {
    columns.iter().max_by_key(|c| c.year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_fenced_response() {
        let text = "```json\n{\"revenue\": 391035, \"net_income\": 93736, \"operating_income\": 123216, \"dep_amort\": 11445, \"reporting_currency\": \"usd\", \"fiscal_year\": 2024}\n```";
        let figures = parse_figures(text).unwrap();
        assert_relative_eq!(figures.revenue, 391_035.0);
        assert_relative_eq!(figures.net_income, 93_736.0);
        assert_relative_eq!(figures.ebitda, 134_661.0);
        assert_eq!(figures.reporting_currency, "USD");
        assert_eq!(figures.fiscal_year, Some(2024));
    }

    #[test]
    fn test_units_normalized_to_millions() {
        let figures =
            parse_figures(r#"{"revenue": 96773000000, "net_income": 15000, "ebitda": 20000}"#)
                .unwrap();
        assert_relative_eq!(figures.revenue, 96_773.0);
        assert_relative_eq!(figures.net_income, 15_000.0);
        assert_eq!(figures.reporting_currency, "USD");
        assert_eq!(figures.fiscal_year, None);
    }

    #[test]
    fn test_string_revenue_rejected() {
        let err =
            parse_figures(r#"{"revenue": "1,000", "net_income": 10, "ebitda": 20}"#).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::NotANumber {
                field: "revenue",
                found: "string"
            }
        ));
    }

    #[rstest]
    #[case(r#"{"net_income": 10, "ebitda": 20}"#, "revenue")]
    #[case(r#"{"revenue": 100, "ebitda": 20}"#, "net_income")]
    #[case(r#"{"revenue": 100, "net_income": 10, "dep_amort": 5}"#, "operating_income")]
    #[case(r#"{"revenue": 100, "net_income": 10, "operating_income": 5}"#, "dep_amort")]
    fn test_missing_fields(#[case] text: &str, #[case] expected: &str) {
        match parse_figures(text) {
            Err(ExtractionError::MissingField { field }) => assert_eq!(field, expected),
            other => panic!("expected missing {expected}, got {other:?}"),
        }
    }

    #[rstest]
    #[case(r#"{"revenue": null, "net_income": 10, "ebitda": 20}"#, "null")]
    #[case(r#"{"revenue": true, "net_income": 10, "ebitda": 20}"#, "boolean")]
    #[case(r#"{"revenue": [1], "net_income": 10, "ebitda": 20}"#, "array")]
    fn test_non_numeric_revenue(#[case] text: &str, #[case] found_type: &str) {
        match parse_figures(text) {
            Err(ExtractionError::NotANumber { field, found }) => {
                assert_eq!(field, "revenue");
                assert_eq!(found, found_type);
            }
            other => panic!("expected NotANumber, got {other:?}"),
        }
    }

    #[test]
    fn test_null_ebitda_is_not_replaced_by_components() {
        let err = parse_figures(
            r#"{"revenue": 100, "net_income": 10, "ebitda": null, "operating_income": 15, "dep_amort": 5}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::NotANumber { field: "ebitda", .. }));
    }

    #[rstest]
    #[case(r#""US Dollars""#)]
    #[case("840")]
    #[case(r#""U$D""#)]
    fn test_invalid_currency(#[case] currency: &str) {
        let text = format!(
            r#"{{"revenue": 100, "net_income": 10, "ebitda": 20, "reporting_currency": {currency}}}"#
        );
        assert!(matches!(
            parse_figures(&text),
            Err(ExtractionError::InvalidCurrency(_))
        ));
    }

    #[rstest]
    #[case("1850")]
    #[case("2024.5")]
    #[case(r#""FY2024""#)]
    fn test_invalid_fiscal_year(#[case] year: &str) {
        let text =
            format!(r#"{{"revenue": 100, "net_income": 10, "ebitda": 20, "fiscal_year": {year}}}"#);
        assert!(matches!(
            parse_figures(&text),
            Err(ExtractionError::InvalidFiscalYear(_))
        ));
    }

    #[test]
    fn test_null_optionals_default() {
        let figures = parse_figures(
            r#"{"revenue": 100, "net_income": 10, "ebitda": 20, "reporting_currency": null, "fiscal_year": 2024.0}"#,
        )
        .unwrap();
        assert_eq!(figures.reporting_currency, "USD");
        assert_eq!(figures.fiscal_year, Some(2024));
    }

    #[test]
    fn test_no_json() {
        assert!(matches!(
            parse_figures("I could not find the income statement."),
            Err(ExtractionError::NoJsonObject)
        ));
        assert!(matches!(
            parse_figures("} backwards {"),
            Err(ExtractionError::NoJsonObject)
        ));
        assert!(matches!(
            parse_figures("{revenue: 1}"),
            Err(ExtractionError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_parse_columns() {
        let text = r#"Here you go:
        {"columns": [
            {"header": "Year Ended September 28, 2024", "year": 2024},
            {"header": "September 30, 2023", "year": 2023},
            {"header": "Notes", "year": "n/a"}
        ]}"#;
        let columns = parse_columns(text).unwrap();
        assert_eq!(columns.len(), 2);

        let latest = latest_column(&columns).unwrap();
        assert_eq!(latest.header, "Year Ended September 28, 2024");
        assert_eq!(latest.year, 2024);
    }

    #[rstest]
    #[case(r#"{"columns": [{"header": "", "year": 2024}, {"header": "2023", "year": 2023}]}"#)]
    #[case(r#"{"columns": [{"header": "   ", "year": 2024}]}"#)]
    #[case(r#"{"columns": [{"year": 2024}]}"#)]
    #[case(r#"{"columns": [{"header": null, "year": 2024}]}"#)]
    fn test_blank_header_rejected(#[case] text: &str) {
        let err = parse_columns(text).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingField { field: "header" }));
        assert!(err.is_schema_violation());
    }

    #[test]
    fn test_latest_column_prefers_rightmost_on_tie() {
        let columns = vec![
            ColumnYear {
                header: "Three months 2024".to_string(),
                year: 2024,
            },
            ColumnYear {
                header: "Twelve months 2024".to_string(),
                year: 2024,
            },
        ];
        assert_eq!(latest_column(&columns).unwrap().header, "Twelve months 2024");
    }

    #[test]
    fn test_parse_columns_empty() {
        assert!(matches!(
            parse_columns(r#"{"columns": []}"#),
            Err(ExtractionError::NoColumns)
        ));
        assert!(matches!(
            parse_columns(r#"{"cols": []}"#),
            Err(ExtractionError::MissingField { field: "columns" })
        ));
    }

    #[test]
    fn test_to_millions() {
        assert_relative_eq!(to_millions(96_773_000_000.0), 96_773.0);
        assert_relative_eq!(to_millions(-200_000_000.0), -200.0);
        assert_relative_eq!(to_millions(100_000_000.0), 100_000_000.0);
        assert_relative_eq!(to_millions(383_285.0), 383_285.0);
    }
}
