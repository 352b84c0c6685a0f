//! Calendar date parsing and formatting.
//!
//! Backend payloads carry dates as strings in several shapes (`2024-01-15`,
//! `2024-01-15T00:00:00.000Z`, ...) and often omit them entirely: missing
//! planning data is a normal case, so parsing degrades to `None` instead of
//! failing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::Granularity;

/// Display locale for labels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR", alias = "pt")]
    PtBr,
    #[serde(rename = "en-US", alias = "en")]
    EnUs,
    #[serde(rename = "es")]
    Es,
}

const MONTHS_PT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::EnUs => "en-US",
            Locale::Es => "es",
        }
    }

    /// Abbreviated month name (`month` is 1-based)
    pub fn month_abbr(&self, month: u32) -> &'static str {
        let table = match self {
            Locale::PtBr => &MONTHS_PT,
            Locale::EnUs => &MONTHS_EN,
            Locale::Es => &MONTHS_ES,
        };
        table[(month.clamp(1, 12) - 1) as usize]
    }

    /// Prefix of week column labels
    pub fn week_prefix(&self) -> &'static str {
        match self {
            Locale::PtBr | Locale::Es => "Sem",
            Locale::EnUs => "Week",
        }
    }

    fn day_first(&self) -> bool {
        !matches!(self, Locale::EnUs)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Unknown locale code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported locale '{0}' (expected pt-BR, en-US or es)")]
pub struct ParseLocaleError(pub String);

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt" | "pt-br" | "pt_br" => Ok(Locale::PtBr),
            "en" | "en-us" | "en_us" => Ok(Locale::EnUs),
            "es" | "es-es" => Ok(Locale::Es),
            other => Err(ParseLocaleError(other.to_string())),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a date-like string into a calendar date.
///
/// Accepts plain dates, RFC 3339 timestamps (the date as written, offset
/// ignored) and offset-less `T`/space separated timestamps. Absent, empty or
/// unparseable input, including impossible dates such as `2024-02-30`,
/// yields `None`.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt.date());
        }
    }
    None
}

/// Shorthand for `parse_date(Some(value))`
pub fn parse_date_str(value: &str) -> Option<NaiveDate> {
    parse_date(Some(value))
}

// ============================================================================
// Formatting
// ============================================================================

/// Day and month, two digits each (`15/01`, or `01/15` for en-US)
pub fn format_short(date: NaiveDate, locale: Locale) -> String {
    if locale.day_first() {
        date.format("%d/%m").to_string()
    } else {
        date.format("%m/%d").to_string()
    }
}

/// Full date (`15/01/2024`, or `01/15/2024` for en-US)
pub fn format_long(date: NaiveDate, locale: Locale) -> String {
    if locale.day_first() {
        date.format("%d/%m/%Y").to_string()
    } else {
        date.format("%m/%d/%Y").to_string()
    }
}

/// `-` for a missing date, otherwise `format_long`
pub fn format_optional(date: Option<NaiveDate>, locale: Locale) -> String {
    date.map(|d| format_long(d, locale))
        .unwrap_or_else(|| "-".to_string())
}

/// `YYYY-MM-DD`, the shape the backend expects
pub fn to_api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Column label for a bucket starting at `date`
pub fn format_by_granularity(date: NaiveDate, granularity: Granularity, locale: Locale) -> String {
    let yy = date.year().rem_euclid(100);
    match granularity {
        Granularity::Day => format_short(date, locale),
        Granularity::Week => format!("{} {}/{:02}", locale.week_prefix(), week_number(date), yy),
        Granularity::Month => format!("{}/{:02}", locale.month_abbr(date.month()), yy),
    }
}

/// Week number as `ceil(days since January 1st / 7) + 1`.
///
/// Not ISO-8601: January 1st is week 1, January 2nd-8th week 2, and week
/// boundaries near year edges do not match the ISO calendar.
pub fn week_number(date: NaiveDate) -> u32 {
    let days = date.ordinal0();
    (days + 6) / 7 + 1
}

// ============================================================================
// Calendar Arithmetic
// ============================================================================

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + chrono::Duration::days(days)
}

/// Monday on or before `date`
pub fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    add_days(date, -offset)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    add_days(date, -(date.day0() as i64))
}

/// First day of the month after `date`'s month
pub fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    first_of_month(date).checked_add_months(chrono::Months::new(1))
}

/// Last day of `date`'s month
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_next_month(date)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parse_plain_date() {
        assert_eq!(parse_date(Some("2024-01-15")), Some(date(2024, 1, 15)));
        assert_eq!(parse_date_str("  2024-01-15 "), Some(date(2024, 1, 15)));
    }

    #[test]
    fn parse_absent_empty_and_malformed() {
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("   ")), None);
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(Some("15/01/2024")), None);
    }

    #[test]
    fn parse_rejects_impossible_calendar_dates() {
        assert_eq!(parse_date(Some("2024-02-30")), None);
        assert_eq!(parse_date(Some("2023-13-01")), None);
        assert_eq!(parse_date(Some("2024-02-29")), Some(date(2024, 2, 29)));
    }

    #[test]
    fn parse_timestamps() {
        assert_eq!(
            parse_date(Some("2024-01-15T00:00:00.000Z")),
            Some(date(2024, 1, 15))
        );
        assert_eq!(
            parse_date(Some("2024-01-15T22:30:00-03:00")),
            Some(date(2024, 1, 15))
        );
        assert_eq!(
            parse_date(Some("2024-01-15T08:00:00")),
            Some(date(2024, 1, 15))
        );
        assert_eq!(
            parse_date(Some("2024-01-15 08:00:00")),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn short_format_follows_locale() {
        let d = date(2024, 1, 5);
        assert_eq!(format_short(d, Locale::PtBr), "05/01");
        assert_eq!(format_short(d, Locale::Es), "05/01");
        assert_eq!(format_short(d, Locale::EnUs), "01/05");
        assert_eq!(format_long(d, Locale::PtBr), "05/01/2024");
        assert_eq!(format_optional(None, Locale::PtBr), "-");
        assert_eq!(to_api_date(d), "2024-01-05");
    }

    #[test]
    fn granularity_labels() {
        let d = date(2024, 3, 4);
        assert_eq!(format_by_granularity(d, Granularity::Day, Locale::PtBr), "04/03");
        assert_eq!(format_by_granularity(d, Granularity::Month, Locale::PtBr), "mar/24");
        assert_eq!(format_by_granularity(d, Granularity::Month, Locale::EnUs), "Mar/24");
        // 2024-03-04 is day 63 (0-based): ceil(63/7) + 1 = 10
        assert_eq!(format_by_granularity(d, Granularity::Week, Locale::PtBr), "Sem 10/24");
        assert_eq!(format_by_granularity(d, Granularity::Week, Locale::EnUs), "Week 10/24");
    }

    #[test]
    fn week_number_approximation() {
        assert_eq!(week_number(date(2024, 1, 1)), 1);
        assert_eq!(week_number(date(2024, 1, 2)), 2);
        assert_eq!(week_number(date(2024, 1, 8)), 2);
        assert_eq!(week_number(date(2024, 1, 9)), 3);
        // Year edge: Dec 31st of a leap year lands in week 54
        assert_eq!(week_number(date(2024, 12, 31)), 54);
    }

    #[test]
    fn locale_parsing() {
        assert_eq!("pt".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!("ES".parse::<Locale>().unwrap(), Locale::Es);
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::default(), Locale::PtBr);
    }

    #[test]
    fn calendar_helpers() {
        // 2024-01-07 is a Sunday
        assert_eq!(monday_on_or_before(date(2024, 1, 7)), date(2024, 1, 1));
        assert_eq!(monday_on_or_before(date(2024, 1, 8)), date(2024, 1, 8));
        assert_eq!(first_of_month(date(2024, 2, 17)), date(2024, 2, 1));
        assert_eq!(first_of_next_month(date(2024, 12, 17)), Some(date(2025, 1, 1)));
        assert_eq!(last_of_month(date(2024, 2, 3)), date(2024, 2, 29));
        assert_eq!(add_days(date(2024, 1, 10), -3), date(2024, 1, 7));
    }
}
