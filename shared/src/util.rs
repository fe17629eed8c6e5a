//! Timestamp and identifier helpers shared by the server and its tests.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound};
use serde::{Deserialize, Deserializer};

use crate::types::Timestamp;

/// Error returned when a stored timestamp cannot be understood
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised timestamp: {0:?}")]
pub struct TimestampError(pub String);

/// Parse a timestamp as stored by the source tables.
///
/// Accepted forms, tried in order:
/// - RFC 3339 (`2024-01-01T02:00:00Z`, `2024-01-01T02:00:00.5+05:00`)
/// - PostgreSQL text output (`2024-01-01 02:00:00+00`)
/// - naive date-time (`2024-01-01T02:00:00`, `2024-01-01 02:00:00`), read as UTC
/// - bare date (`2024-01-01`), midnight UTC
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, TimestampError> {
    let s = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset());
    }

    Err(TimestampError(raw.to_string()))
}

/// Calendar day of a timestamp, taken as written (the offset is ignored).
#[inline]
pub fn calendar_day(ts: &Timestamp) -> NaiveDate {
    ts.date_naive()
}

/// Current UTC time at millisecond precision, the precision reports are stored at
pub fn now() -> Timestamp {
    chrono::Utc::now().trunc_subsecs(3).fixed_offset()
}

/// Storage form of a timestamp: RFC 3339, UTC, milliseconds (`2024-01-01T02:00:00.000Z`)
///
/// Strings in this form sort chronologically.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.with_timezone(&chrono::Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Deserialize an identifier that may arrive as a string or a JSON number.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Optional variant of [`deserialize_id`]; `null` and absent both map to `None`.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

/// Deserialize a timestamp column using [`parse_timestamp`].
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Nullable timestamp column; `null` and absent both map to `None`.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
