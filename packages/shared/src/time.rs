//! Time-related utilities.
//!
//! Timestamps are Unix milliseconds and rendered in JST.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// JST offset from UTC in seconds (+09:00).
const JST_OFFSET_SECONDS: i32 = 9 * 60 * 60;

fn jst() -> FixedOffset {
    // +09:00 is always within the valid offset range
    FixedOffset::east_opt(JST_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Get the current Unix timestamp in milliseconds.
pub fn get_jst_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a Unix timestamp (milliseconds) to an RFC 3339 string in JST.
///
/// Out-of-range timestamps fall back to the Unix epoch.
///
/// # Examples
///
/// ```
/// use kakehashi_shared::time::timestamp_to_jst_rfc3339;
///
/// assert_eq!(timestamp_to_jst_rfc3339(0), "1970-01-01T09:00:00+09:00");
/// ```
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_millis).unwrap_or_default();
    utc.with_timezone(&jst()).to_rfc3339()
}
