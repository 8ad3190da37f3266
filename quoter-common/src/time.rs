//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current Unix epoch time in milliseconds
///
/// Used for `edited_at`, v2 quote `date` and attachment id salting.
pub fn now_millis() -> i64 {
    now().timestamp_millis()
}
