use std::sync::Arc;
use tracing::info;

use super::candidate::{MergeCandidate, MergeOutcome};
use super::classifier::ErrorClassifier;
use super::errors::ErrorKind;
use super::session::EngineSession;

/// Issues the merge command for one candidate and classifies the result.
#[derive(Clone)]
pub struct MergeExecutor {
    classifier: Arc<dyn ErrorClassifier>,
}

impl MergeExecutor {
    pub fn new(classifier: Arc<dyn ErrorClassifier>) -> Self {
        Self { classifier }
    }

    pub async fn apply(
        &self,
        session: &mut dyn EngineSession,
        candidate: &MergeCandidate,
    ) -> MergeOutcome {
        info!(
            target: "ch_optimizer::executor",
            table = %candidate.table(),
            partition_name = %candidate.partition_name(),
            "Going to merge TABLE {} PARTITION {}",
            candidate.table(),
            candidate.partition_name()
        );

        let err = match session
            .optimize_partition(candidate.table(), candidate.partition_id())
            .await
        {
            Ok(()) => {
                info!(
                    target: "ch_optimizer::executor",
                    table = %candidate.table(),
                    partition_name = %candidate.partition_name(),
                    "Partition merged"
                );
                return MergeOutcome::Applied;
            }
            Err(err) => err,
        };

        match self.classifier.classify(&err) {
            ErrorKind::MergeConflict => {
                info!(
                    target: "ch_optimizer::executor",
                    table = %candidate.table(),
                    partition_name = %candidate.partition_name(),
                    "The partition is already merging"
                );
                MergeOutcome::AlreadyMerging
            }
            _ => {
                err.log_error(&format!(
                    "Fail to merge partition {} of {}",
                    candidate.partition_name(),
                    candidate.table()
                ));
                MergeOutcome::Failed(err)
            }
        }
    }
}
