use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use super::candidate::MergeOutcome;
use super::classifier::ErrorClassifier;
use super::errors::CycleError;
use super::executor::MergeExecutor;
use super::querier::MetadataQuerier;
use super::session::Connector;
use crate::shared::config::{ConnectPolicy, Settings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub optimize_interval: Duration,
    pub loop_interval: Duration,
    pub one_shot: bool,
    pub dry_run: bool,
    pub on_connect_failure: ConnectPolicy,
}

impl SchedulerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            optimize_interval: settings.clickhouse.optimize_interval,
            loop_interval: settings.daemon.loop_interval,
            one_shot: settings.is_one_shot(),
            dry_run: settings.daemon.dry_run,
            on_connect_failure: settings.daemon.on_connect_failure,
        }
    }

    /// Dry runs never loop.
    pub fn is_one_shot(&self) -> bool {
        self.one_shot || self.dry_run
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Succeeded,
    Failed,
}

/// Tally of one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub candidates: usize,
    pub applied: usize,
    pub already_merging: usize,
    pub failed: usize,
    /// Candidates left untouched because shutdown was requested mid-cycle.
    pub skipped: usize,
    pub dry_run: bool,
}

impl CycleReport {
    fn record(&mut self, outcome: &MergeOutcome) {
        match outcome {
            MergeOutcome::Applied => self.applied += 1,
            MergeOutcome::AlreadyMerging => self.already_merging += 1,
            MergeOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn status(&self) -> CycleStatus {
        if self.failed == 0 && self.skipped == 0 {
            CycleStatus::Succeeded
        } else {
            CycleStatus::Failed
        }
    }
}

/// Drives detection and merging, one cycle at a time.
pub struct Scheduler<C> {
    connector: C,
    querier: MetadataQuerier,
    executor: MergeExecutor,
    options: SchedulerOptions,
}

impl<C: Connector> Scheduler<C> {
    pub fn new(
        connector: C,
        classifier: Arc<dyn ErrorClassifier>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            connector,
            querier: MetadataQuerier::new(options.optimize_interval),
            executor: MergeExecutor::new(classifier),
            options,
        }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// Connect, select candidates, merge them in order, disconnect.
    ///
    /// A failed merge does not stop the remaining ones; it only shows up in
    /// the report. Once `shutdown` is cancelled no further merge is issued and
    /// the rest of the candidates are counted as skipped.
    pub async fn run_cycle(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<CycleReport, CycleError> {
        let mut session = self
            .connector
            .connect()
            .await
            .map_err(CycleError::Connect)?;
        session.ping().await.map_err(CycleError::Connect)?;

        let merges = self
            .querier
            .candidates(session.as_mut())
            .await
            .map_err(CycleError::Query)?;

        let mut report = CycleReport {
            candidates: merges.len(),
            dry_run: self.options.dry_run,
            ..CycleReport::default()
        };

        if self.options.dry_run {
            info!(target: "ch_optimizer::scheduler", merges = merges.len(), "DRY RUN. Merges would be applied: {}", merges.len());
            return Ok(report);
        }
        info!(target: "ch_optimizer::scheduler", merges = merges.len(), "Merges will be applied: {}", merges.len());

        for (done, merge) in merges.iter().enumerate() {
            if shutdown.is_cancelled() {
                report.skipped = merges.len() - done;
                warn!(
                    target: "ch_optimizer::scheduler",
                    skipped = report.skipped,
                    "Shutdown requested, not issuing the remaining merges"
                );
                break;
            }
            let outcome = self.executor.apply(session.as_mut(), merge).await;
            report.record(&outcome);
        }

        drop(session);
        Ok(report)
    }

    /// Runs cycles until one-shot completion, a fatal connectivity error or
    /// `shutdown`. Returns the status of the last cycle.
    ///
    /// Cancellation stops the loop between cycles and keeps a running cycle
    /// from issuing more merges; an in-flight merge command is not aborted.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<CycleStatus, CycleError> {
        trace!(target: "ch_optimizer::scheduler", options = ?self.options, "Starting loop function");
        let mut status = CycleStatus::Succeeded;

        loop {
            if shutdown.is_cancelled() {
                info!(target: "ch_optimizer::scheduler", "Shutdown requested, stopping");
                return Ok(status);
            }

            status = match self.run_cycle(&shutdown).await {
                Ok(report) => {
                    info!(
                        target: "ch_optimizer::scheduler",
                        candidates = report.candidates,
                        applied = report.applied,
                        already_merging = report.already_merging,
                        failed = report.failed,
                        skipped = report.skipped,
                        dry_run = report.dry_run,
                        "Optimization round finished"
                    );
                    report.status()
                }
                Err(e) => {
                    e.log_error();
                    if e.is_connect() && self.options.on_connect_failure == ConnectPolicy::Exit {
                        return Err(e);
                    }
                    if e.is_connect() {
                        warn!(target: "ch_optimizer::scheduler", "Will retry the connection on the next round");
                    }
                    CycleStatus::Failed
                }
            };

            if self.options.is_one_shot() || shutdown.is_cancelled() {
                return Ok(status);
            }

            info!(
                target: "ch_optimizer::scheduler",
                "Optimizations round is over, going to sleep for {}",
                humantime::format_duration(self.options.loop_interval)
            );
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(target: "ch_optimizer::scheduler", "Shutdown requested, stopping");
                    return Ok(status);
                }
                _ = sleep(self.options.loop_interval) => {}
            }
        }
    }
}
