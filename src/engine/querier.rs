use chrono::Utc;
use std::time::Duration;
use tracing::debug;

use super::candidate::MergeCandidate;
use super::eligibility::{EligibilityPolicy, PartitionStats};
use super::errors::EngineError;
use super::session::EngineSession;

/// Turns the engine's partition metadata into the ordered list of merges due
/// in this cycle.
#[derive(Debug, Clone, Copy)]
pub struct MetadataQuerier {
    policy: EligibilityPolicy,
}

impl MetadataQuerier {
    pub fn new(optimize_interval: Duration) -> Self {
        Self {
            policy: EligibilityPolicy::new(optimize_interval),
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    pub async fn candidates(
        &self,
        session: &mut dyn EngineSession,
    ) -> Result<Vec<MergeCandidate>, EngineError> {
        let snapshot = session.partition_stats().await?;
        let now = snapshot.observed_at.unwrap_or_else(Utc::now);
        debug!(
            target: "ch_optimizer::querier",
            rows = snapshot.rows.len(),
            now = %now,
            "Fetched partition metadata"
        );

        let merges = self.select(snapshot.rows, now);
        for m in &merges {
            debug!(
                target: "ch_optimizer::querier",
                table = %m.table(),
                partition_id = %m.partition_id(),
                partition_name = %m.partition_name(),
                age = m.age().as_secs(),
                parts = m.part_count(),
                max_time = %m.max_time(),
                rollup_time = ?m.rollup_time(),
                modified_at = %m.modified_at(),
                "Merge to be applied"
            );
        }
        Ok(merges)
    }

    /// Filters rows through the policy and orders them by
    /// `(table, partition_name, age)`. The sort is stable.
    pub fn select(
        &self,
        rows: Vec<PartitionStats>,
        now: chrono::DateTime<Utc>,
    ) -> Vec<MergeCandidate> {
        let mut merges: Vec<MergeCandidate> = rows
            .into_iter()
            .filter_map(|row| MergeCandidate::admit(row, &self.policy, now))
            .collect();
        merges.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        merges
    }
}
