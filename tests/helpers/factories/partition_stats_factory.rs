use crate::engine::PartitionStats;
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

/// Fixed reference clock for tests: 2024-06-01T00:00:00Z.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// Builds rows that are eligible under a one hour interval at
/// [`reference_now`] unless overridden.
pub struct PartitionStatsFactory {
    table: String,
    partition_id: String,
    partition_name: String,
    age: Duration,
    part_count: u64,
    max_time: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl PartitionStatsFactory {
    pub fn new() -> Self {
        let now = reference_now();
        Self {
            table: "`graphite`.`data`".to_string(),
            partition_id: "20240101".to_string(),
            partition_name: "2024-01-01".to_string(),
            age: Duration::from_secs(86_400),
            part_count: 3,
            max_time: now - chrono::Duration::days(10),
            modified_at: now - chrono::Duration::hours(2),
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Sets both the partition id and a matching display name.
    pub fn partition(mut self, id: &str) -> Self {
        self.partition_id = id.to_string();
        self.partition_name = format!("'{id}'");
        self
    }

    pub fn partition_name(mut self, name: &str) -> Self {
        self.partition_name = name.to_string();
        self
    }

    pub fn age_secs(mut self, secs: u64) -> Self {
        self.age = Duration::from_secs(secs);
        self
    }

    pub fn parts(mut self, count: u64) -> Self {
        self.part_count = count;
        self
    }

    pub fn max_time(mut self, at: DateTime<Utc>) -> Self {
        self.max_time = at;
        self
    }

    pub fn modified_at(mut self, at: DateTime<Utc>) -> Self {
        self.modified_at = at;
        self
    }

    pub fn create(self) -> PartitionStats {
        PartitionStats {
            table: self.table,
            partition_id: self.partition_id,
            partition_name: self.partition_name,
            age: self.age,
            part_count: self.part_count,
            max_time: self.max_time,
            modified_at: self.modified_at,
        }
    }
}
