use chrono::{DateTime, Utc};
use std::time::Duration;

/// One aggregated `(table, partition)` row as reported by the engine, before
/// the eligibility decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionStats {
    pub table: String,
    pub partition_id: String,
    pub partition_name: String,
    /// Largest retention age configured for the table.
    pub age: Duration,
    /// Distinct active parts in the partition.
    pub part_count: u64,
    /// One tick past the newest data point in the partition.
    pub max_time: DateTime<Utc>,
    /// Oldest modification time among the active parts.
    pub modified_at: DateTime<Utc>,
}

impl PartitionStats {
    /// `max_time + age`, or `None` when it does not fit in a timestamp.
    pub fn rollup_time(&self) -> Option<DateTime<Utc>> {
        rollup_time(self.max_time, self.age)
    }
}

pub fn rollup_time(max_time: DateTime<Utc>, age: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(age)
        .ok()
        .and_then(|age| max_time.checked_add_signed(age))
}

/// Decides whether a partition is due for a merge.
///
/// All three must hold:
/// 1. the rollup deadline passed without a merge (`modified_at < max_time + age`),
///    or new parts landed since the last one (`part_count > 1`);
/// 2. the partition was not touched within the last `interval`;
/// 3. `interval < age`, otherwise the partition is still hot.
///
/// Every comparison is strict, equal values are not eligible.
pub fn eligible(
    age: Duration,
    part_count: u64,
    max_time: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    interval: Duration,
    now: DateTime<Utc>,
) -> bool {
    // Overflowing deadlines lie in the far future.
    let not_rolled_up = match rollup_time(max_time, age) {
        Some(deadline) => modified_at < deadline,
        None => true,
    };

    // A cutoff below the representable range excludes everything.
    let settled = match chrono::Duration::from_std(interval)
        .ok()
        .and_then(|interval| now.checked_sub_signed(interval))
    {
        Some(cutoff) => modified_at < cutoff,
        None => false,
    };

    (not_rolled_up || part_count > 1) && settled && interval < age
}

/// The eligibility predicate bound to the configured optimize interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityPolicy {
    interval: Duration,
}

impl EligibilityPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn admits(&self, stats: &PartitionStats, now: DateTime<Utc>) -> bool {
        eligible(
            stats.age,
            stats.part_count,
            stats.max_time,
            stats.modified_at,
            self.interval,
            now,
        )
    }
}
