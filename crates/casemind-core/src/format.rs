//! Indonesian display formatting shared by both front-ends.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Placeholder for missing values.
pub const EMPTY: &str = "-";

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `1234567.891` → `1.234.567,89` with at most `max_fraction_digits`
/// decimals and no trailing zeros. Non-finite input formats as `0`.
pub fn format_number(value: f64, max_fraction_digits: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let rounded = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac)) => (int_part, frac.trim_end_matches('0')),
        None => (rounded.as_str(), ""),
    };

    let mut out = String::new();
    if value < 0.0 && (!int_part.trim_start_matches('0').is_empty() || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

/// Rupiah without fraction digits: `Rp 1.500.000`.
pub fn format_currency(value: f64) -> String {
    let amount = format_number(value, 0);
    match amount.strip_prefix('-') {
        Some(abs) => format!("-Rp {}", abs),
        None => format!("Rp {}", amount),
    }
}

/// Like [`format_currency`] but `-` for a missing amount.
pub fn format_optional_currency(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_else(|| EMPTY.to_string())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// `2024-01-12` → `12 Jan 2024`; `-` when missing or unparsable.
pub fn format_date(value: Option<&str>) -> String {
    use chrono::Datelike;

    match value.filter(|v| !v.trim().is_empty()).and_then(parse_date) {
        Some(date) => format!(
            "{} {} {}",
            date.day(),
            MONTHS[date.month0() as usize],
            date.year()
        ),
        None => EMPTY.to_string(),
    }
}

/// `short_stay_high_cost` → `short stay high cost`.
pub fn humanize_flag(flag: &str) -> String {
    flag.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1.234.567,89");
        assert_eq!(format_number(0.5, 2), "0,5");
        assert_eq!(format_number(1000.0, 2), "1.000");
        assert_eq!(format_number(-42.0, 0), "-42");
        assert_eq!(format_number(-0.001, 2), "0");
        assert_eq!(format_number(f64::NAN, 2), "0");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1_500_000.0), "Rp 1.500.000");
        assert_eq!(format_currency(999.6), "Rp 1.000");
        assert_eq!(format_currency(-250_000.0), "-Rp 250.000");
        assert_eq!(format_optional_currency(None), "-");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-01-12")), "12 Jan 2024");
        assert_eq!(format_date(Some("2024-08-03T10:15:00Z")), "3 Agu 2024");
        assert_eq!(format_date(Some("2024-05-30 08:00:00")), "30 Mei 2024");
        assert_eq!(format_date(Some("yesterday")), "-");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_humanize_flag() {
        assert_eq!(humanize_flag("short_stay_high_cost"), "short stay high cost");
    }
}
