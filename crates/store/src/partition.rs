use chrono::{DateTime, Utc};

/// Storage key for the log document covering the UTC calendar day of `now`.
///
/// Total over any instant and base name; the boundary between two keys is
/// UTC midnight.
pub fn day_key(base_name: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.format("%Y-%m-%d"), base_name)
}
