//! Display formatting for figures and dates
//!
//! Digits are ASCII with `,` thousands grouping and `.` as the decimal
//! separator; currency and date words are Arabic.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

pub const DEFAULT_CURRENCY: &str = "EGP";

const MONTHS_AR: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "أبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

// Monday first, matching `num_days_from_monday`
const WEEKDAYS_AR: [&str; 7] = [
    "الاثنين",
    "الثلاثاء",
    "الأربعاء",
    "الخميس",
    "الجمعة",
    "السبت",
    "الأحد",
];

/// Format `value` with exactly `decimals` fraction digits and grouped thousands
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + formatted.len() / 3 + 1);
    // Negative values that round to zero print without a sign
    if value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "EGP" => "ج.م.",
        other => other,
    }
}

/// Two-decimal amount followed by the currency symbol
pub fn format_currency(value: f64, code: &str) -> String {
    format!("{} {}", format_number(value, 2), currency_symbol(code))
}

/// Short amount for summary cards: millions, thousands, or the full amount
pub fn format_compact_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1} م.ج", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.0} ألف ج", value / 1_000.0)
    } else {
        format_currency(value, DEFAULT_CURRENCY)
    }
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{}%", format_number(value, decimals))
}

/// Date presentation styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateStyle {
    /// `05/03/2024`
    #[default]
    Short,
    /// `5 مارس 2024`
    Long,
    /// `الثلاثاء، 5 مارس 2024`
    Full,
}

pub fn format_date(date: NaiveDate, style: DateStyle) -> String {
    let month = MONTHS_AR[date.month0() as usize];
    match style {
        DateStyle::Short => format!("{:02}/{:02}/{}", date.day(), date.month(), date.year()),
        DateStyle::Long => format!("{} {} {}", date.day(), month, date.year()),
        DateStyle::Full => {
            let weekday = WEEKDAYS_AR[date.weekday().num_days_from_monday() as usize];
            format!("{}، {} {} {}", weekday, date.day(), month, date.year())
        }
    }
}

/// Parse a backend date: `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Cut `text` to `length` characters, marking the cut with `...`
pub fn truncate(text: &str, length: usize) -> String {
    match text.char_indices().nth(length) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

/// Relative change between two periods
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    /// Absolute percentage change
    pub percentage: f64,
    pub direction: TrendDirection,
}

/// Percentage change from `previous` to `current`; neutral when there is
/// no previous value to compare against.
pub fn calculate_trend(current: f64, previous: f64) -> Trend {
    if previous == 0.0 {
        return Trend {
            percentage: 0.0,
            direction: TrendDirection::Neutral,
        };
    }

    let percentage = (current - previous) / previous * 100.0;
    let direction = if percentage > 0.0 {
        TrendDirection::Up
    } else if percentage < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    };

    Trend {
        percentage: percentage.abs(),
        direction,
    }
}
