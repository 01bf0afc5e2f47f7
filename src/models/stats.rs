use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Rolling visit counts for one short code.
///
/// The windows are cumulative: `total >= week >= day`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub day: u64,
    pub week: u64,
    pub total: u64,
}

impl Stats {
    pub const fn new(day: u64, week: u64, total: u64) -> Self {
        Self { day, week, total }
    }
}

/// Visit-log key for an instant: RFC3339, second resolution, `Z` suffix.
///
/// Keys sort lexicographically in chronological order, and every visit within
/// the same second shares one key.
pub fn visit_key(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
