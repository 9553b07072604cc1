//! Database query modules for CRUD operations.
//!
//! Each module provides async functions that operate on the database.

pub mod accounts;
pub mod api_keys;
pub mod trackers;
pub mod users;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

/// Formats a timestamp the way every table stores it.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored timestamp inside a row mapper.
pub(crate) fn parse_timestamp(
    value: &str,
    column: usize,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2025, 1, 9, 23, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 10, 1, 0, 0).unwrap();
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn timestamp_round_trip() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let stored = format_timestamp(&dt);
        assert_eq!(stored, "2025-03-04T05:06:07.000Z");
        assert_eq!(parse_timestamp(&stored, 0).unwrap(), dt);
    }

    #[test]
    fn bad_timestamp_is_conversion_error() {
        let err = parse_timestamp("yesterday", 3).unwrap_err();
        assert!(matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _)
        ));
    }
}
