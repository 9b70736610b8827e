//! Serde helpers for the ISO-8601 timestamps stored on every record.
//!
//! Timestamps are written as RFC 3339 UTC strings with millisecond precision,
//! e.g. `2026-10-18T09:30:00.123Z`, so that the date prefix of a stored value
//! is always the UTC calendar day it was taken on.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Returns the current instant truncated to the precision that is persisted.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Returns the current UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Formats a timestamp the way it is persisted.
pub fn format(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(timestamp))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn can_format_with_millisecond_precision_and_utc_suffix() {
        let timestamp = Utc
            .with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
            .unwrap()
            .with_nanosecond(123_000_000)
            .unwrap();

        assert_eq!(format(&timestamp), "2026-10-18T09:30:00.123Z");
    }

    #[test]
    fn can_parse_offset_timestamps_into_utc() {
        let parsed = deserialize(serde_json::json!("2026-10-18T01:00:00.000+02:00")).unwrap();

        assert_eq!(format(&parsed), "2026-10-17T23:00:00.000Z");
    }

    #[test]
    fn now_has_no_sub_millisecond_component() {
        let timestamp = now();
        assert_eq!(timestamp.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
