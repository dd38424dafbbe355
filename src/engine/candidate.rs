use chrono::{DateTime, Utc};
use std::time::Duration;

use super::eligibility::{EligibilityPolicy, PartitionStats};
use super::errors::EngineError;

/// A partition that passed the eligibility check in the current cycle.
///
/// There is no public constructor besides [`MergeCandidate::admit`], so a
/// candidate always satisfies the policy it was admitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    table: String,
    partition_id: String,
    partition_name: String,
    age: Duration,
    part_count: u64,
    max_time: DateTime<Utc>,
    rollup_time: Option<DateTime<Utc>>,
    modified_at: DateTime<Utc>,
}

impl MergeCandidate {
    pub fn admit(
        stats: PartitionStats,
        policy: &EligibilityPolicy,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if !policy.admits(&stats, now) {
            return None;
        }
        let rollup_time = stats.rollup_time();
        Some(Self {
            table: stats.table,
            partition_id: stats.partition_id,
            partition_name: stats.partition_name,
            age: stats.age,
            part_count: stats.part_count,
            max_time: stats.max_time,
            rollup_time,
            modified_at: stats.modified_at,
        })
    }

    /// Fully qualified, quoted table identifier.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn partition_id(&self) -> &str {
        &self.partition_id
    }

    pub fn partition_name(&self) -> &str {
        &self.partition_name
    }

    pub fn age(&self) -> Duration {
        self.age
    }

    pub fn part_count(&self) -> u64 {
        self.part_count
    }

    pub fn max_time(&self) -> DateTime<Utc> {
        self.max_time
    }

    /// `None` if `max_time + age` overflows.
    pub fn rollup_time(&self) -> Option<DateTime<Utc>> {
        self.rollup_time
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub(crate) fn sort_key(&self) -> (&str, &str, Duration) {
        (&self.table, &self.partition_name, self.age)
    }
}

/// Result of issuing one merge command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    /// Someone else already started merging this partition.
    AlreadyMerging,
    Failed(EngineError),
}

impl MergeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, MergeOutcome::Failed(_))
    }
}
