//! Date and amount format detection for imported files
//!
//! Each detector holds a fixed list of candidate patterns and keeps the ones
//! consistent with every recognizable sample. Samples no candidate accepts
//! are left out of detection, so one bad cell costs its own row only.

use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

/// Candidate date formats, in preference order
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y%m%d",
];

fn parses_date(text: &str, format: &str) -> bool {
    NaiveDate::parse_from_str(text, format).is_ok()
}

/// Return every candidate format that parses all recognizable samples
///
/// A sample is recognizable when at least one candidate parses it.
pub fn detect_date_formats<S: AsRef<str>>(samples: &[S]) -> Vec<&'static str> {
    let samples: Vec<&str> = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| DATE_FORMATS.iter().any(|fmt| parses_date(s, fmt)))
        .collect();
    if samples.is_empty() {
        return Vec::new();
    }

    DATE_FORMATS
        .iter()
        .copied()
        .filter(|fmt| samples.iter().all(|s| parses_date(s, fmt)))
        .collect()
}

/// Decimal and grouping separators of an amount column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountFormat {
    /// `1,234.56`
    DotDecimal,
    /// `1.234,56`
    CommaDecimal,
    /// `1 234.56`
    SpaceGroupDotDecimal,
}

impl AmountFormat {
    pub const ALL: [AmountFormat; 3] = [
        AmountFormat::DotDecimal,
        AmountFormat::CommaDecimal,
        AmountFormat::SpaceGroupDotDecimal,
    ];

    fn pattern(self) -> &'static Regex {
        lazy_static! {
            static ref DOT: Regex =
                Regex::new(r"^[-+]?(\d{1,3}(,\d{3})+|\d+)(\.\d{1,2})?$").unwrap();
            static ref COMMA: Regex =
                Regex::new(r"^[-+]?(\d{1,3}(\.\d{3})+|\d+)(,\d{1,2})?$").unwrap();
            static ref SPACE: Regex =
                Regex::new(r"^[-+]?(\d{1,3}( \d{3})+|\d+)(\.\d{1,2})?$").unwrap();
        }

        match self {
            AmountFormat::DotDecimal => &*DOT,
            AmountFormat::CommaDecimal => &*COMMA,
            AmountFormat::SpaceGroupDotDecimal => &*SPACE,
        }
    }

    /// Strip currency symbols and parenthesized negatives, returning (negative, body)
    fn clean(text: &str) -> (bool, String) {
        let text = text.trim();
        let (negative, text) = if text.starts_with('(') && text.ends_with(')') && text.len() >= 2 {
            (true, &text[1..text.len() - 1])
        } else {
            (false, text)
        };
        let body: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ' ' | '-' | '+'))
            .collect();
        (negative, body.trim().to_string())
    }

    pub fn accepts(self, text: &str) -> bool {
        let (_, body) = Self::clean(text);
        !body.is_empty() && self.pattern().is_match(&body)
    }

    /// Parse to hundredths of the currency unit
    pub fn parse_scaled(self, text: &str) -> Option<i64> {
        let (negative, body) = Self::clean(text);
        if body.is_empty() || !self.pattern().is_match(&body) {
            return None;
        }

        let canonical: String = match self {
            AmountFormat::DotDecimal => body.replace(',', ""),
            AmountFormat::CommaDecimal => body.replace('.', "").replace(',', "."),
            AmountFormat::SpaceGroupDotDecimal => body.replace(' ', ""),
        };

        let mut amount = Decimal::from_str(&canonical).ok()?;
        if negative && amount > Decimal::ZERO {
            amount = -amount;
        }
        let scaled = (amount * Decimal::ONE_HUNDRED).round();
        i64::try_from(scaled).ok()
    }
}

/// Pick the first amount format consistent with every recognizable sample
pub fn detect_amount_format<S: AsRef<str>>(samples: &[S]) -> Option<AmountFormat> {
    let samples: Vec<&str> = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| AmountFormat::ALL.iter().any(|format| format.accepts(s)))
        .collect();
    if samples.is_empty() {
        return None;
    }

    AmountFormat::ALL
        .into_iter()
        .find(|format| samples.iter().all(|s| format.accepts(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_unambiguous_dates() {
        assert_eq!(detect_date_formats(&["2024-01-15", "2024-12-31"]), vec!["%Y-%m-%d"]);
        assert_eq!(detect_date_formats(&["15/01/2024", "31/12/2024"]), vec!["%d/%m/%Y"]);
        assert_eq!(detect_date_formats(&["01/15/2024", ""]), vec!["%m/%d/%Y"]);
    }

    #[test]
    fn test_detect_ambiguous_dates_keeps_all_candidates() {
        assert_eq!(detect_date_formats(&["01/02/2024"]), vec!["%m/%d/%Y", "%d/%m/%Y"]);
    }

    #[test]
    fn test_detect_dates_with_no_samples() {
        let empty: [&str; 0] = [];
        assert!(detect_date_formats(&empty).is_empty());
        assert!(detect_date_formats(&["not a date"]).is_empty());
    }

    #[test]
    fn test_detect_amount_formats() {
        assert_eq!(detect_amount_format(&["1,234.56", "-12.00"]), Some(AmountFormat::DotDecimal));
        assert_eq!(detect_amount_format(&["1.234,56", "12,5"]), Some(AmountFormat::CommaDecimal));
        assert_eq!(
            detect_amount_format(&["1 234.56", "7.10"]),
            Some(AmountFormat::SpaceGroupDotDecimal)
        );
        assert_eq!(detect_amount_format(&["12,34.5"]), None);
    }

    #[test]
    fn test_parse_scaled() {
        assert_eq!(AmountFormat::DotDecimal.parse_scaled("$1,234.56"), Some(123456));
        assert_eq!(AmountFormat::DotDecimal.parse_scaled("(100.00)"), Some(-10000));
        assert_eq!(AmountFormat::DotDecimal.parse_scaled("-4.5"), Some(-450));
        assert_eq!(AmountFormat::CommaDecimal.parse_scaled("1.234,56 €"), Some(123456));
        assert_eq!(AmountFormat::SpaceGroupDotDecimal.parse_scaled("12 000"), Some(1200000));
        assert_eq!(AmountFormat::DotDecimal.parse_scaled("abc"), None);
    }

    #[test]
    fn test_unrecognizable_samples_do_not_spoil_detection() {
        assert_eq!(
            detect_date_formats(&["2024-01-15", "2024-01-16", "n/a"]),
            vec!["%Y-%m-%d"]
        );
        assert_eq!(
            detect_amount_format(&["1.234,56", "12,50", "n/a"]),
            Some(AmountFormat::CommaDecimal)
        );
        assert_eq!(detect_amount_format(&["n/a", "pending"]), None);
    }
}
