pub use super::factories::PartitionStatsFactory;

pub struct Factory;

impl Factory {
    pub fn partition_stats() -> PartitionStatsFactory {
        PartitionStatsFactory::new()
    }
}
