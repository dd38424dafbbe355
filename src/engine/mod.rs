pub mod candidate;
pub mod classifier;
pub mod clickhouse;
pub mod eligibility;
pub mod errors;
pub mod executor;
pub mod querier;
pub mod scheduler;
pub mod session;

pub use candidate::{MergeCandidate, MergeOutcome};
pub use classifier::{ClickHouseClassifier, ErrorClassifier};
pub use clickhouse::ClickHouseConnector;
pub use eligibility::{EligibilityPolicy, PartitionStats, eligible};
pub use errors::*;
pub use executor::MergeExecutor;
pub use querier::MetadataQuerier;
pub use scheduler::{CycleReport, CycleStatus, Scheduler, SchedulerOptions};
pub use session::{Connector, EngineSession, PartitionSnapshot};
