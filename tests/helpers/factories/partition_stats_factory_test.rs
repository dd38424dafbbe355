use super::partition_stats_factory::reference_now;
use crate::engine::EligibilityPolicy;
use crate::test_helpers::Factory;
use std::time::Duration;

#[test]
fn default_row_is_eligible_under_one_hour_interval() {
    let row = Factory::partition_stats().create();
    let policy = EligibilityPolicy::new(Duration::from_secs(3600));

    assert!(policy.admits(&row, reference_now()));
}

#[test]
fn partition_sets_id_and_name() {
    let row = Factory::partition_stats().partition("202405").create();

    assert_eq!(row.partition_id, "202405");
    assert_eq!(row.partition_name, "'202405'");
}
