use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

pub const MIN_YEAR: i32 = 1990;
pub const MAX_YEAR: i32 = 2100;

static ISO_LIKE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})(.*)$").ok());
static DAY_FIRST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})(\D.*)?$").ok());
static DAY_MONTH_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?[-\s/.]+([A-Za-z]{3,9})\.?[-\s/.,]+(\d{4}|\d{2})(\D.*)?$")
        .ok()
});
static MONTH_NAME_DAY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{3,9})\.?[-\s/]+(\d{1,2})(?:st|nd|rd|th)?,?[-\s/]+(\d{4}|\d{2})(\D.*)?$")
        .ok()
});
static TIME_OF_DAY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[T\s,]*(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\.\d+)?\s*([AaPp][Mm])?").ok()
});

/// Parses a transaction date written in any of the supported layouts.
///
/// Attempts run in a fixed order and the first interpretation whose year lies
/// in [`MIN_YEAR`, `MAX_YEAR`] wins: Unix timestamps (10 digits = seconds,
/// 11–13 = milliseconds), year-first dates, day-first numeric dates, and
/// finally textual dates with month names or RFC 2822/3339 stamps.
pub fn parse_transaction_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let attempts: [fn(&str) -> Option<NaiveDateTime>; 4] = [
        parse_unix_timestamp,
        parse_year_first,
        parse_day_first,
        parse_textual,
    ];
    attempts
        .iter()
        .find_map(|attempt| attempt(trimmed).filter(year_in_range))
}

/// Two-digit years above 50 belong to the 1900s, the rest to the 2000s.
pub fn expand_two_digit_year(year: i32) -> i32 {
    if year > 50 { 1900 + year } else { 2000 + year }
}

fn year_in_range(value: &NaiveDateTime) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&value.year())
}

fn parse_unix_timestamp(value: &str) -> Option<NaiveDateTime> {
    if !(10..=13).contains(&value.len()) || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let raw = value.parse::<i64>().ok()?;
    let parsed = if value.len() == 10 {
        DateTime::from_timestamp(raw, 0)
    } else {
        DateTime::from_timestamp_millis(raw)
    };
    parsed.map(|stamp| stamp.naive_utc())
}

fn parse_year_first(value: &str) -> Option<NaiveDateTime> {
    let captures = ISO_LIKE.as_ref()?.captures(value)?;
    let year = captures.get(1)?.as_str().parse::<i32>().ok()?;
    let month = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let day = captures.get(3)?.as_str().parse::<u32>().ok()?;
    let rest = captures.get(4).map_or("", |found| found.as_str());
    if rest.starts_with(|character: char| character.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(time_of_day(rest)))
}

fn parse_day_first(value: &str) -> Option<NaiveDateTime> {
    let captures = DAY_FIRST.as_ref()?.captures(value)?;
    let day = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let month = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let year = parse_year_token(captures.get(3)?.as_str())?;
    let rest = captures.get(4).map_or("", |found| found.as_str());
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(time_of_day(rest)))
}

fn parse_textual(value: &str) -> Option<NaiveDateTime> {
    if let Some(parsed) = parse_day_month_name(value) {
        return Some(parsed);
    }
    if let Some(parsed) = parse_month_name_day(value) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.naive_local());
    }
    None
}

fn parse_day_month_name(value: &str) -> Option<NaiveDateTime> {
    let captures = DAY_MONTH_NAME.as_ref()?.captures(value)?;
    let day = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let month = month_from_name(captures.get(2)?.as_str())?;
    let year = parse_year_token(captures.get(3)?.as_str())?;
    let rest = captures.get(4).map_or("", |found| found.as_str());
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(time_of_day(rest)))
}

fn parse_month_name_day(value: &str) -> Option<NaiveDateTime> {
    let captures = MONTH_NAME_DAY.as_ref()?.captures(value)?;
    let month = month_from_name(captures.get(1)?.as_str())?;
    let day = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let year = parse_year_token(captures.get(3)?.as_str())?;
    let rest = captures.get(4).map_or("", |found| found.as_str());
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(time_of_day(rest)))
}

fn parse_year_token(token: &str) -> Option<i32> {
    let year = token.parse::<i32>().ok()?;
    if token.len() == 2 {
        return Some(expand_two_digit_year(year));
    }
    Some(year)
}

fn month_from_name(name: &str) -> Option<u32> {
    let lowered = name.to_ascii_lowercase();
    let month = match lowered.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Reads an optional wall-clock time after the date part; anything that is
/// not a recognizable time leaves the transaction at midnight.
fn time_of_day(rest: &str) -> NaiveTime {
    parse_time_of_day(rest).unwrap_or(NaiveTime::MIN)
}

fn parse_time_of_day(rest: &str) -> Option<NaiveTime> {
    let captures = TIME_OF_DAY.as_ref()?.captures(rest)?;
    let mut hour = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let minute = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let second = match captures.get(3) {
        Some(found) => found.as_str().parse::<u32>().ok()?,
        None => 0,
    };

    if let Some(meridiem) = captures.get(4) {
        let is_pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        if hour == 0 || hour > 12 {
            return None;
        }
        hour = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (value, true) => value + 12,
            (value, false) => value,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, Timelike};

    use super::{expand_two_digit_year, parse_transaction_date};

    fn jan_15_2024() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, 15)
    }

    fn parsed_date(value: &str) -> Option<NaiveDate> {
        parse_transaction_date(value).map(|parsed: NaiveDateTime| parsed.date())
    }

    #[test]
    fn all_supported_layouts_resolve_to_the_same_day() {
        for value in [
            "2024-01-15",
            "2024/1/15",
            "15/01/2024",
            "15-01-2024",
            "15.01.24",
            "15-Jan-24",
            "15 January 2024",
            "Jan 15, 2024",
            "1705276800",
            "1705276800000",
            "2024-01-15T10:30:00Z",
        ] {
            assert_eq!(parsed_date(value), jan_15_2024(), "layout `{value}`");
        }
    }

    #[test]
    fn keeps_time_of_day_when_present() {
        let parsed = parse_transaction_date("2024-01-15 03:45:10");
        assert!(parsed.is_some());
        if let Some(value) = parsed {
            assert_eq!(value.hour(), 3);
            assert_eq!(value.minute(), 45);
        }

        let afternoon = parse_transaction_date("15/01/2024 2:05 PM");
        assert_eq!(afternoon.map(|value| value.hour()), Some(14));

        let midnight = parse_transaction_date("15/01/2024");
        assert_eq!(midnight.map(|value| value.hour()), Some(0));
    }

    #[test]
    fn rejects_years_outside_supported_range() {
        assert_eq!(parse_transaction_date("1899-01-15"), None);
        assert_eq!(parse_transaction_date("2101-01-15"), None);
        assert_eq!(parse_transaction_date("15/01/1899"), None);
        assert_eq!(parse_transaction_date("15-Jan-2101"), None);
    }

    #[test]
    fn rejects_unparseable_values() {
        assert_eq!(parse_transaction_date(""), None);
        assert_eq!(parse_transaction_date("yesterday"), None);
        assert_eq!(parse_transaction_date("2024-13-40"), None);
        assert_eq!(parse_transaction_date("31/02/2024"), None);
        assert_eq!(parse_transaction_date("123456789"), None);
    }

    #[test]
    fn two_digit_years_pivot_at_fifty() {
        assert_eq!(expand_two_digit_year(24), 2024);
        assert_eq!(expand_two_digit_year(50), 2050);
        assert_eq!(expand_two_digit_year(51), 1951);
        assert_eq!(expand_two_digit_year(99), 1999);
        assert_eq!(parsed_date("01/02/99"), NaiveDate::from_ymd_opt(1999, 2, 1));
    }
}
