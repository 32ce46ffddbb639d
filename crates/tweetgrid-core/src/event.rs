use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AggregateError, Result};

/// Native `created_at` layout of tweet archives, e.g.
/// `Wed Oct 10 20:19:24 +0000 2018`.
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A single timestamped event. The zone used to localize it is supplied
/// per aggregation call, so every event of one call shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        parse_timestamp(raw).map(Self::new)
    }

    pub fn from_millis(millis: i64) -> Result<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Self::new)
            .ok_or_else(|| AggregateError::InvalidTimestamp(millis.to_string()))
    }
}

impl From<DateTime<Utc>> for Event {
    fn from(timestamp: DateTime<Utc>) -> Self {
        Self::new(timestamp)
    }
}

/// Parses an absolute instant from epoch milliseconds, RFC 3339, or the
/// archive `created_at` layout.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(AggregateError::InvalidTimestamp(raw.to_string()));
    }

    let digits = token.strip_prefix('-').unwrap_or(token);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return token
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| AggregateError::InvalidTimestamp(raw.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(token, ARCHIVE_TIMESTAMP_FORMAT) {
        return Ok(dt.with_timezone(&Utc));
    }

    Err(AggregateError::InvalidTimestamp(raw.to_string()))
}
