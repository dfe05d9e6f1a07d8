//! Wall-clock helpers. Timestamps are epoch milliseconds throughout.

use time::OffsetDateTime;

/// Current UTC time in epoch milliseconds.
pub fn now_millis() -> i64 {
    millis_of(OffsetDateTime::now_utc())
}

pub fn millis_of(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// RFC 3339 rendering for CLI output; falls back to the raw number.
pub fn format_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|at| at.format(&time::format_description::well_known::Rfc3339).ok())
        .unwrap_or_else(|| millis.to_string())
}
