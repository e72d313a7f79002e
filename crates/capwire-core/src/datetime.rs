//! The fixed timestamp text profile used by every external representation.

use chrono::{DateTime, FixedOffset, ParseResult};

/// Render format: ISO-8601 with an explicit numeric UTC offset, never `Z`.
pub const CAP_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Renders a timestamp in the fixed profile, e.g. `2003-06-17T14:57:00-07:00`.
pub fn format_cap_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.format(CAP_DATETIME_FORMAT).to_string()
}

/// Parses an RFC 3339 timestamp, preserving the sender's UTC offset.
///
/// Decoding is more lenient than encoding: `Z` and fractional seconds are
/// accepted on input, while output always carries a numeric offset.
pub fn parse_cap_datetime(s: &str) -> ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
}
