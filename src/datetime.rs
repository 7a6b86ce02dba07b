//! Timestamp parsing and formatting.
//!
//! The parser routes date-keyed values to one of two entry points chosen by
//! the shape of the raw text: ISO-8601 (`2006-03-28T14:55:21Z`) or the
//! space-separated legacy form (`2006-03-28 14:55:21 UTC`) that older API
//! payloads carry. Both are plain `fn`s so callers can swap them out without
//! any process-wide state.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// A string → timestamp entry point.
pub type DateFn = fn(&str) -> Option<DateTime<FixedOffset>>;

/// The pair of timestamp parsers captured by a
/// [`Parser`](crate::de::Parser) at construction.
#[derive(Debug, Clone, Copy)]
pub struct DateParsers {
    /// Used when the raw text contains no space.
    pub iso: DateFn,
    /// Used when the raw text contains a space.
    pub legacy: DateFn,
}

impl Default for DateParsers {
    fn default() -> Self {
        DateParsers {
            iso: parse_isoformat,
            legacy: parse_legacy,
        }
    }
}

/// Parses an ISO-8601 timestamp.
///
/// Accepts an optional fractional second and an optional offset (`Z`,
/// `+hh:mm`, ...); offset-less input is taken as UTC, as is a bare date.
pub fn parse_isoformat(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

/// Parses the legacy `YYYY-MM-DD HH:MM:SS` form, with an optional fractional
/// second and an optional trailing ` UTC`. The result is always UTC.
pub fn parse_legacy(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.strip_suffix(" UTC").unwrap_or(s);
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Some(naive.and_utc().fixed_offset())
}

/// Formats a timestamp the way the API emits them: `YYYY-MM-DDThh:mm:ssZ`,
/// with a 6-digit fraction inserted when the microsecond part is non-zero.
/// Non-UTC offsets fail with [`Error::NonUtcTimestamp`].
pub(crate) fn format_timestamp(dt: &DateTime<FixedOffset>) -> Result<String> {
    if dt.offset().local_minus_utc() != 0 {
        return Err(Error::NonUtcTimestamp(*dt.offset()));
    }
    let micros = dt.timestamp_subsec_micros();
    if micros == 0 {
        Ok(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
    } else {
        Ok(format!("{}.{:06}Z", dt.format("%Y-%m-%dT%H:%M:%S"), micros))
    }
}
