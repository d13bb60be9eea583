//! Currency, quantity and date formatting
//!
//! Every displayed value in a report goes through this module. All functions
//! are total: missing or non-finite amounts render as zero and unparsable
//! dates render as a fixed placeholder.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Placeholder shown for dates the backend sent in an unknown shape
pub const INVALID_DATE: &str = "Date invalide";

/// Grouping and currency settings for monetary values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    /// Inserted between groups of three integer digits
    pub grouping_separator: String,
    /// Appended after the amount, separated by a space (empty for none)
    pub currency_suffix: String,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            grouping_separator: " ".to_string(),
            currency_suffix: "FBU".to_string(),
        }
    }
}

impl MoneyFormat {
    pub fn new(grouping_separator: &str, currency_suffix: &str) -> Self {
        Self {
            grouping_separator: grouping_separator.to_string(),
            currency_suffix: currency_suffix.to_string(),
        }
    }

    /// Whole currency units with thousands grouping, e.g. `1 234 567`
    pub fn amount(&self, value: Option<f64>) -> String {
        let rounded = amount_or_zero(value).round();
        if rounded == 0.0 {
            return "0".to_string();
        }

        let digits = format!("{:.0}", rounded.abs());
        let grouped = group_digits(&digits, &self.grouping_separator);
        if rounded < 0.0 {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }

    /// Amount followed by the currency suffix, e.g. `1 234 567 FBU`
    pub fn currency(&self, value: Option<f64>) -> String {
        let amount = self.amount(value);
        if self.currency_suffix.is_empty() {
            amount
        } else {
            format!("{} {}", amount, self.currency_suffix)
        }
    }

    /// Quantities keep up to three decimals, trailing zeros trimmed, `,` as
    /// decimal separator
    pub fn quantity(&self, value: Option<f64>) -> String {
        let value = amount_or_zero(value);
        let fixed = format!("{:.3}", value.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
        let frac = frac_part.trim_end_matches('0');

        if int_part == "0" && frac.is_empty() {
            return "0".to_string();
        }

        let mut out = String::new();
        if value < 0.0 {
            out.push('-');
        }
        out.push_str(&group_digits(int_part, &self.grouping_separator));
        if !frac.is_empty() {
            out.push(',');
            out.push_str(frac);
        }
        out
    }
}

/// Missing and non-finite amounts count as zero
pub fn amount_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Sort key for French labels: accents stripped, case folded, so that
/// `Équipements` sorts among the `E`s
pub fn collation_key(label: &str) -> String {
    label
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare labels on [`collation_key`], falling back to byte order for ties
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Insert `separator` between groups of three digits, counting from the right
fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

/// Format with the default settings (space grouping, no suffix)
pub fn format_amount(value: Option<f64>) -> String {
    MoneyFormat::default().amount(value)
}

/// Format with the default settings (space grouping, `FBU` suffix)
pub fn format_currency(value: Option<f64>) -> String {
    MoneyFormat::default().currency(value)
}

pub fn format_quantity(value: Option<f64>) -> String {
    MoneyFormat::default().quantity(value)
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Date part of a timestamp as `dd/mm/yyyy`
pub fn format_datetime(datetime: NaiveDateTime) -> String {
    format_date(datetime.date())
}

/// Parse a date as the backend sends it
///
/// Accepts `yyyy-mm-dd`, ISO timestamps with or without fractional seconds,
/// and RFC 3339 timestamps with an offset.
pub fn parse_backend_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(dt.date());
        }
    }
    None
}

/// Render a backend date string, or [`INVALID_DATE`] when absent or unparsable
pub fn format_backend_date(value: Option<&str>) -> String {
    value
        .and_then(parse_backend_date)
        .map(format_date)
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_amount_formats_as_zero() {
        assert_eq!(format_currency(None), format_currency(Some(0.0)));
        assert_eq!(format_currency(None), "0 FBU");
        assert_eq!(format_amount(Some(f64::NAN)), "0");
        assert_eq!(format_amount(Some(f64::INFINITY)), "0");
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(format_amount(Some(1234567.0)), "1 234 567");
        assert_eq!(format_amount(Some(999.0)), "999");
        assert_eq!(format_amount(Some(1000.0)), "1 000");
        assert_eq!(format_amount(Some(100000.0)), "100 000");
        assert_eq!(format_currency(Some(1234567.0)), "1 234 567 FBU");
    }

    #[test]
    fn test_zero_fraction_digits() {
        assert_eq!(format_amount(Some(1234.4)), "1 234");
        assert_eq!(format_amount(Some(1234.5)), "1 235");
        assert_eq!(format_amount(Some(-1234.5)), "-1 235");
        assert_eq!(format_amount(Some(-0.4)), "0");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(format_amount(Some(-2500000.0)), "-2 500 000");
    }

    #[test]
    fn test_custom_money_format() {
        let fmt = MoneyFormat::new(".", "");
        assert_eq!(fmt.currency(Some(1234567.0)), "1.234.567");

        let fmt = MoneyFormat::new("\u{202f}", "BIF");
        assert_eq!(fmt.currency(Some(1500.0)), "1\u{202f}500 BIF");
    }

    #[test]
    fn test_quantity() {
        assert_eq!(format_quantity(Some(12.5)), "12,5");
        assert_eq!(format_quantity(Some(1250.125)), "1 250,125");
        assert_eq!(format_quantity(Some(3.0)), "3");
        assert_eq!(format_quantity(None), "0");
        assert_eq!(format_quantity(Some(-0.0001)), "0");
        assert_eq!(format_quantity(Some(-4.25)), "-4,25");
    }

    #[test]
    fn test_collation_folds_accents_and_case() {
        assert_eq!(collation_key(" Équipements "), "equipements");
        assert_eq!(collation_key("Médicaments"), "medicaments");
        assert_eq!(compare_labels("Équipements", "Fournitures"), Ordering::Less);
        assert_eq!(compare_labels("ecran", "Écran"), Ordering::Less);
        assert_eq!(compare_labels("Zinc", "éther"), Ordering::Greater);

        let mut labels = vec!["Zinc", "Équipements", "alcool", "Fournitures"];
        labels.sort_by(|a, b| compare_labels(a, b));
        assert_eq!(labels, vec!["alcool", "Équipements", "Fournitures", "Zinc"]);
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_date(date), "07/03/2025");
    }

    #[test]
    fn test_parse_backend_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 31);
        assert_eq!(parse_backend_date("2025-01-31"), expected);
        assert_eq!(parse_backend_date("2025-01-31T14:05:00"), expected);
        assert_eq!(parse_backend_date("2025-01-31T14:05:00.123"), expected);
        assert_eq!(parse_backend_date("2025-01-31T14:05:00Z"), expected);
        assert_eq!(parse_backend_date("2025-01-31T14:05:00+02:00"), expected);
        assert_eq!(parse_backend_date("2025-01-31 14:05:00"), expected);
        assert_eq!(parse_backend_date("31/01/2025"), None);
        assert_eq!(parse_backend_date(""), None);
    }

    #[test]
    fn test_format_backend_date() {
        assert_eq!(format_backend_date(Some("2025-01-31T08:00:00")), "31/01/2025");
        assert_eq!(format_backend_date(Some("garbage")), INVALID_DATE);
        assert_eq!(format_backend_date(None), INVALID_DATE);
    }
}
