//! RFC 3339 timestamp helpers.
//!
//! Timestamps are written in UTC with microsecond precision and an explicit
//! `+00:00` offset. Any explicit offset is accepted on read and normalized to
//! UTC, so records written by other clients in local time still parse.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp as RFC 3339 with an explicit UTC offset.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Parses an RFC 3339 timestamp carrying any explicit offset.
pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Serde adapter for `DateTime<Utc>` fields using [`format`] and [`parse`].
pub mod rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_has_explicit_utc_offset() {
        let dt = Utc.with_ymd_and_hms(2025, 8, 19, 11, 24, 56).unwrap();
        assert_eq!(format(&dt), "2025-08-19T11:24:56.000000+00:00");
    }

    #[test]
    fn test_parse_normalizes_offset_to_utc() {
        let parsed = parse("2025-08-19T16:54:56+05:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 8, 19, 11, 24, 56).unwrap());
    }

    #[test]
    fn test_parse_rejects_missing_offset() {
        assert!(parse("2025-08-19T16:54:56").is_err());
    }

    #[test]
    fn test_formatted_timestamps_sort_lexicographically() {
        let earlier = Utc.with_ymd_and_hms(2025, 1, 9, 23, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 10, 1, 0, 0).unwrap();
        assert!(format(&earlier) < format(&later));
    }
}
