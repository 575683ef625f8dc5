//! The delivery watermark and its text forms.
//!
//! A [`Cursor`] is written out as RFC 3339 with nanoseconds. When reading one
//! back, [`parse_cursor`] also accepts RFC 2822 / RFC 1123 dates, so a watermark
//! copied from an HTTP header or a log line can be fed straight back in.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery watermark.
///
/// Everything with a visibility deadline at or below the cursor has already been
/// offered to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(DateTime<Utc>);

impl Cursor {
    /// The starting watermark when no checkpoint exists.
    pub const EARLIEST: Cursor = Cursor(DateTime::<Utc>::UNIX_EPOCH);

    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    /// RFC 3339 with nanoseconds, the layout used for checkpoints and logs.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::EARLIEST
    }
}

impl From<DateTime<Utc>> for Cursor {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl FromStr for Cursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_cursor(s)
    }
}

// RFC 1123 with a zone name chrono's RFC 2822 parser does not know.
const RFC1123_UTC_LAYOUT: &str = "%a, %d %b %Y %H:%M:%S";
const UTC_SUFFIXES: [&str; 2] = [" UTC", " Z"];

/// Parse a cursor from RFC 3339, RFC 2822 (which covers RFC 1123 with numeric
/// or named US zones) or RFC 1123 with a `UTC` suffix.
pub fn parse_cursor(input: &str) -> Result<Cursor> {
    let text = input.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(Cursor(at.with_timezone(&Utc)));
    }
    if let Ok(at) = DateTime::parse_from_rfc2822(text) {
        return Ok(Cursor(at.with_timezone(&Utc)));
    }
    for suffix in UTC_SUFFIXES {
        if let Some(naive) = text.strip_suffix(suffix) {
            if let Ok(at) = NaiveDateTime::parse_from_str(naive, RFC1123_UTC_LAYOUT) {
                return Ok(Cursor(at.and_utc()));
            }
        }
    }

    Err(Error::InvalidCursor {
        input: input.to_string(),
    })
}
