//! Cell formatting shared by the table renderers.

use comps_valuation::{Multiple, MultipleFormat};

/// Placeholder for values that cannot be shown.
pub const NOT_APPLICABLE: &str = "N/A";

/// Whole number with thousands separators, e.g. `391035.4` as `391,035`.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return NOT_APPLICABLE.to_string();
    }

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// An absolute amount in millions, with separators.
pub fn millions(value: f64) -> String {
    thousands(value / 1e6)
}

/// Market capitalization in billions, e.g. `$3.45B`.
pub fn billions(value: f64) -> String {
    if value.is_finite() && value > 0.0 {
        format!("${:.2}B", value / 1e9)
    } else {
        NOT_APPLICABLE.to_string()
    }
}

/// Render a multiple per its registry format.
pub fn multiple(value: Multiple, format: MultipleFormat) -> String {
    match (value.value(), format) {
        (None, _) => NOT_APPLICABLE.to_string(),
        (Some(_), MultipleFormat::Times(precision)) => format!("{value:.precision$}"),
        (Some(v), MultipleFormat::Percent(precision)) => format!("{:.precision$}%", v * 100.0),
    }
}

/// Render an optional statistic per its registry format.
pub fn statistic(value: Option<f64>, format: MultipleFormat) -> String {
    value.map_or_else(
        || NOT_APPLICABLE.to_string(),
        |v| multiple(Multiple::Value(v), format),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use comps_valuation::DivisionError;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0")]
    #[case(999.4, "999")]
    #[case(1_000.0, "1,000")]
    #[case(391_035.0, "391,035")]
    #[case(-1_234_567.0, "-1,234,567")]
    #[case(-0.4, "0")]
    #[case(f64::NAN, "N/A")]
    fn test_thousands(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(thousands(value), expected);
    }

    #[test]
    fn test_millions_and_billions() {
        assert_eq!(millions(391_035_000_000.0), "391,035");
        assert_eq!(billions(3_450_000_000_000.0), "$3450.00B");
        assert_eq!(billions(0.0), "N/A");
    }

    #[test]
    fn test_multiple_formats() {
        assert_eq!(multiple(Multiple::Value(28.456), MultipleFormat::Times(1)), "28.5x");
        assert_eq!(multiple(Multiple::Value(7.0), MultipleFormat::Times(2)), "7.00x");
        assert_eq!(multiple(Multiple::Value(0.2397), MultipleFormat::Percent(2)), "23.97%");
        assert_eq!(
            multiple(
                Multiple::NotApplicable(DivisionError::NonPositiveEarnings),
                MultipleFormat::Times(1)
            ),
            "N/A"
        );
        assert_eq!(statistic(None, MultipleFormat::Times(2)), "N/A");
    }
}
