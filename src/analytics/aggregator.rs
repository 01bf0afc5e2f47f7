//! Rolling-window aggregation over a visit log
//!
//! A visit log is a sequence of `(visit_key, count)` entries. Given the log in
//! descending key order, a single backward pass fills the three nested
//! windows: entries newer than the day cutoff, then the week cutoff, then
//! everything older. Each entry is consumed exactly once.

use chrono::{DateTime, Duration, Utc};

use crate::models::{visit_key, Stats};

/// Window boundaries computed for one query instant.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    day_cutoff: String,
    week_cutoff: String,
}

impl StatsAggregator {
    /// Build the cutoffs `now - 24h` and `now - 7d` in visit-key format.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            day_cutoff: visit_key(now - Duration::days(1)),
            week_cutoff: visit_key(now - Duration::days(7)),
        }
    }

    pub fn day_cutoff(&self) -> &str {
        &self.day_cutoff
    }

    pub fn week_cutoff(&self) -> &str {
        &self.week_cutoff
    }

    /// Accumulate a visit log into day/week/total counts.
    ///
    /// `entries` must be ordered by key, newest first. An entry exactly at a
    /// cutoff counts as inside that window.
    pub fn aggregate<I, K>(&self, entries: I) -> Stats
    where
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        let mut entries = entries.into_iter().peekable();
        let mut stats = Stats::default();

        while let Some((_, count)) =
            entries.next_if(|(key, _)| key.as_ref() >= self.day_cutoff.as_str())
        {
            stats.day += count;
        }

        stats.week = stats.day;
        while let Some((_, count)) =
            entries.next_if(|(key, _)| key.as_ref() >= self.week_cutoff.as_str())
        {
            stats.week += count;
        }

        stats.total = stats.week + entries.map(|(_, count)| count).sum::<u64>();

        stats
    }
}
