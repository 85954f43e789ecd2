use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp the way rows persist it: RFC 3339 with microsecond
/// precision and an explicit +00:00 offset.
pub fn format_utc(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Date component used to key daily partitions (YYYY-MM-DD).
pub fn day_stamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}
