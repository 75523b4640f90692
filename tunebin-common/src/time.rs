//! Timestamp utilities

use chrono::{SecondsFormat, Utc};

/// Current UTC timestamp as fixed-width RFC 3339 text (sorts chronologically)
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Milliseconds since the Unix epoch, used as the upload filename prefix
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
