//! Tolerant cell extraction shared by carrier adapters.
//!
//! Every numeric and date reader follows the same policy: an empty cell (or a
//! column the file does not have) yields the zero value, while a non-empty
//! cell that does not parse is an error naming the column.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime};

use crate::{
    error::{AdapterError, FieldParseCause, Result},
    header::HeaderIndex,
};

/// Compact date layout used by some carrier exports, e.g. `3/5/24`.
const COMPACT_DATE_FORMAT: &str = "%m/%d/%y";

/// `%y` reads `69` as 2069; bill exports treat 69-99 as the 1900s.
const COMPACT_YEAR_PIVOT: i32 = 2069;

/// `0001-01-01T00:00:00+00:00`, stood in for empty date cells.
pub fn zero_date() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .fixed_offset()
}

pub fn text<'a>(row: &'a [String], index: &HeaderIndex, column: &str) -> &'a str {
    index.value(row, column)
}

pub fn float(row: &[String], index: &HeaderIndex, column: &str) -> Result<f64> {
    let raw = index.value(row, column).trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|source| AdapterError::FieldParse {
            column: column.to_string(),
            source: FieldParseCause::Float {
                value: raw.to_string(),
                source,
            },
        })
}

pub fn integer(row: &[String], index: &HeaderIndex, column: &str) -> Result<i64> {
    let raw = index.value(row, column).trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<i64>()
        .map_err(|source| AdapterError::FieldParse {
            column: column.to_string(),
            source: FieldParseCause::Integer {
                value: raw.to_string(),
                source,
            },
        })
}

pub fn date(
    row: &[String],
    index: &HeaderIndex,
    column: &str,
) -> Result<Option<DateTime<FixedOffset>>> {
    parse_bill_date(index.value(row, column), column)
}

/// Parses a bill date: strict RFC-3339 first, then the compact `M/D/YY`
/// layout read as midnight UTC. Empty input is the zero date (`None`).
pub fn parse_bill_date(value: &str, column: &str) -> Result<Option<DateTime<FixedOffset>>> {
    if value.is_empty() {
        return Ok(None);
    }
    if is_strict_rfc3339(value) {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Ok(Some(parsed));
        }
    }
    NaiveDate::parse_from_str(value, COMPACT_DATE_FORMAT)
        .ok()
        .and_then(|date| {
            if date.year() == COMPACT_YEAR_PIVOT {
                date.with_year(1969)
            } else {
                Some(date)
            }
        })
        .map(|date| Some(date.and_time(NaiveTime::MIN).and_utc().fixed_offset()))
        .ok_or_else(|| AdapterError::DateParse {
            column: column.to_string(),
            value: value.to_string(),
        })
}

// chrono also takes a space or lowercase `t` between date and time and a
// lowercase `z`; exports only ever carry the uppercase forms.
fn is_strict_rfc3339(value: &str) -> bool {
    value.as_bytes().get(10) == Some(&b'T') && !value.ends_with('z')
}

/// `YYYY-MM-DD` in the timestamp's own offset; the zero date without one.
pub fn format_day(date: Option<&DateTime<FixedOffset>>) -> String {
    date.copied()
        .unwrap_or_else(zero_date)
        .format("%Y-%m-%d")
        .to_string()
}
