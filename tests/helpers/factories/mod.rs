pub mod partition_stats_factory;

pub use partition_stats_factory::PartitionStatsFactory;

#[cfg(test)]
mod partition_stats_factory_test;
