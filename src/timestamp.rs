//! Wall-clock timestamps for API responses and webhook payloads.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// RFC 3339 UTC with millisecond precision (`2026-01-01T12:00:00.000Z`).
const MILLIS_UTC: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Current UTC time as an RFC 3339 string with milliseconds.
#[must_use]
pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

/// Format a timestamp in UTC, falling back to the Unix epoch.
#[must_use]
pub fn format_rfc3339(at: OffsetDateTime) -> String {
    at.to_offset(UtcOffset::UTC)
        .format(MILLIS_UTC)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00.000Z"))
}
