//! Canonical forms for consultation times and dates.
//!
//! Times are rendered as `"<hour> <AM|PM>"`, dates as `YYYY-MM-DD` taken from
//! the UTC calendar day. Inputs that can't be understood are passed through
//! instead of rejected.

use crate::types::DateValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[:.\s]+").unwrap();
    static ref COMPACT_TIME: Regex = Regex::new(r"^([0-9]{1,2})(?:00)?(AM|PM)$").unwrap();
    static ref ISO_DAY: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
}

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// `"09:00am"`, `"9am"`, `"9.AM"` and `"9 AM"` all become `"9 AM"`.
/// Anything else is returned trimmed but otherwise untouched.
pub fn normalize_preferred_time(input: &str) -> String {
    let upper = input.to_uppercase();
    let compact = SEPARATORS.replace_all(upper.trim(), "");
    let without_zeros = compact.trim_start_matches('0');

    if let Some(captures) = COMPACT_TIME.captures(without_zeros) {
        if let Ok(hour) = captures[1].parse::<u32>() {
            return format!("{hour} {}", &captures[2]);
        }
    }
    input.trim().to_string()
}

/// Date of a pending write as it is compared against stored rows. Only real
/// date values are converted, everything else is taken as already formatted.
pub fn normalize_input_date(value: &DateValue) -> String {
    match value {
        DateValue::DateTime(datetime) => utc_day(datetime),
        DateValue::Millis(millis) => millis.to_string(),
        DateValue::Text(text) => text.clone(),
    }
}

enum DateShape<'a> {
    Numeric(i64),
    IsoString(&'a str),
    FreeString(&'a str),
    DateValue(DateTime<Utc>),
}

fn classify(value: &DateValue) -> Option<DateShape<'_>> {
    match value {
        DateValue::Millis(millis) => Some(DateShape::Numeric(*millis)),
        DateValue::DateTime(datetime) => Some(DateShape::DateValue(*datetime)),
        DateValue::Text(text) if text.is_empty() => None,
        DateValue::Text(text) if text.bytes().all(|byte| byte.is_ascii_digit()) => {
            match text.parse::<i64>() {
                Ok(millis) => Some(DateShape::Numeric(millis)),
                Err(_) => Some(DateShape::FreeString(text)),
            }
        }
        DateValue::Text(text) if ISO_DAY.is_match(text) => Some(DateShape::IsoString(text)),
        DateValue::Text(text) => Some(DateShape::FreeString(text)),
    }
}

/// Grouping key of a stored date. `None` means the row carries no date.
pub fn date_key(value: &DateValue) -> Option<String> {
    let key = match classify(value)? {
        DateShape::Numeric(millis) => DateTime::from_timestamp_millis(millis)
            .map(|datetime| utc_day(&datetime))
            .unwrap_or_else(|| millis.to_string()),
        DateShape::IsoString(text) => text.to_string(),
        DateShape::FreeString(text) => parse_free_date(text)
            .map(|datetime| utc_day(&datetime))
            .unwrap_or_else(|| text.to_string()),
        DateShape::DateValue(datetime) => utc_day(&datetime),
    };
    Some(key)
}

fn utc_day(datetime: &DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%d").to_string()
}

fn parse_free_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.with_timezone(&Utc));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(text) {
        return Some(datetime.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|datetime| datetime.and_utc());
        }
    }
    None
}
