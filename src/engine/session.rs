use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::eligibility::PartitionStats;
use super::errors::EngineError;

/// Aggregated partition rows together with the engine clock they were read at.
#[derive(Debug, Clone, Default)]
pub struct PartitionSnapshot {
    pub observed_at: Option<DateTime<Utc>>,
    pub rows: Vec<PartitionStats>,
}

/// A single connection to the storage engine. Lives for exactly one cycle and
/// is closed when dropped.
#[async_trait]
pub trait EngineSession: Send {
    async fn ping(&mut self) -> Result<(), EngineError>;

    /// Per-partition aggregates for every table that has retention rules.
    async fn partition_stats(&mut self) -> Result<PartitionSnapshot, EngineError>;

    /// Asks the engine to merge one partition down to a single part.
    async fn optimize_partition(
        &mut self,
        table: &str,
        partition_id: &str,
    ) -> Result<(), EngineError>;
}

/// Opens fresh sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError>;
}
