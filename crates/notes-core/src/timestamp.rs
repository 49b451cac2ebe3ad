//! Display helpers for on-chain timestamps.
//!
//! The program stores `Clock::unix_timestamp`, i.e. whole seconds.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::errors::{NotesError, NotesResult};

/// Format unix seconds as an RFC 3339 UTC timestamp.
pub fn format_unix_seconds(secs: i64) -> NotesResult<String> {
    let dt = OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| NotesError::Time(format!("timestamp {secs} out of range: {e}")))?;
    dt.format(&Rfc3339)
        .map_err(|e| NotesError::Time(e.to_string()))
}

/// Like [`format_unix_seconds`] but falls back to the raw number.
pub fn display_unix_seconds(secs: i64) -> String {
    format_unix_seconds(secs).unwrap_or_else(|_| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch() {
        assert_eq!(format_unix_seconds(0).unwrap(), "1970-01-01T00:00:00Z");
        assert_eq!(
            format_unix_seconds(1_700_000_000).unwrap(),
            "2023-11-14T22:13:20Z"
        );
    }

    #[test]
    fn out_of_range_falls_back() {
        assert!(format_unix_seconds(i64::MAX).is_err());
        assert_eq!(display_unix_seconds(i64::MAX), i64::MAX.to_string());
    }
}
