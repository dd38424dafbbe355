use crate::engine::{
    Connector, EngineError, EngineSession, PartitionSnapshot, PartitionStats,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct FakeState {
    rows: Vec<PartitionStats>,
    now: Option<DateTime<Utc>>,
    connect_errors: Vec<EngineError>,
    ping_error: Option<EngineError>,
    query_errors: Vec<EngineError>,
    merge_errors: HashMap<String, EngineError>,
    connects: usize,
    open_sessions: usize,
    max_open_sessions: usize,
    queries: Vec<Instant>,
    merges: Vec<(String, String)>,
    cancel_after: Option<(usize, CancellationToken)>,
    cancel_after_merges: Option<(usize, CancellationToken)>,
}

/// In-memory engine. Every clone shares the same state so a test can keep a
/// handle while the scheduler owns the connector.
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, rows: Vec<PartitionStats>) -> Self {
        self.state.lock().unwrap().rows = rows;
        self
    }

    /// Clock reported together with the partition rows.
    pub fn at(self, now: DateTime<Utc>) -> Self {
        self.state.lock().unwrap().now = Some(now);
        self
    }

    /// Queues a failure for the next connect attempt.
    pub fn failing_connect(self, err: EngineError) -> Self {
        self.state.lock().unwrap().connect_errors.push(err);
        self
    }

    pub fn failing_ping(self, err: EngineError) -> Self {
        self.state.lock().unwrap().ping_error = Some(err);
        self
    }

    /// Queues a failure for the next metadata query.
    pub fn failing_query(self, err: EngineError) -> Self {
        self.state.lock().unwrap().query_errors.push(err);
        self
    }

    pub fn failing_merge(self, partition_id: &str, err: EngineError) -> Self {
        self.state
            .lock()
            .unwrap()
            .merge_errors
            .insert(partition_id.to_string(), err);
        self
    }

    /// Cancels `token` while opening the n-th connection.
    pub fn cancel_on_connect(self, n: usize, token: CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_after = Some((n, token));
        self
    }

    /// Cancels `token` once the n-th merge command has been received.
    pub fn cancel_after_merges(self, n: usize, token: CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_after_merges = Some((n, token));
        self
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn max_open_sessions(&self) -> usize {
        self.state.lock().unwrap().max_open_sessions
    }

    pub fn open_sessions(&self) -> usize {
        self.state.lock().unwrap().open_sessions
    }

    pub fn query_instants(&self) -> Vec<Instant> {
        self.state.lock().unwrap().queries.clone()
    }

    /// `(table, partition_id)` of every merge command received, in order.
    pub fn merges(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().merges.clone()
    }
}

#[async_trait]
impl Connector for FakeEngine {
    async fn connect(&self) -> Result<Box<dyn EngineSession>, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if let Some((n, token)) = &state.cancel_after {
            if state.connects == *n {
                token.cancel();
            }
        }
        if !state.connect_errors.is_empty() {
            return Err(state.connect_errors.remove(0));
        }
        state.open_sessions += 1;
        state.max_open_sessions = state.max_open_sessions.max(state.open_sessions);
        Ok(Box::new(FakeSession {
            engine: self.clone(),
        }))
    }
}

struct FakeSession {
    engine: FakeEngine,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.engine.state.lock().unwrap().open_sessions -= 1;
    }
}

#[async_trait]
impl EngineSession for FakeSession {
    async fn ping(&mut self) -> Result<(), EngineError> {
        match &self.engine.state.lock().unwrap().ping_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn partition_stats(&mut self) -> Result<PartitionSnapshot, EngineError> {
        let mut state = self.engine.state.lock().unwrap();
        state.queries.push(Instant::now());
        if !state.query_errors.is_empty() {
            return Err(state.query_errors.remove(0));
        }
        Ok(PartitionSnapshot {
            observed_at: state.now,
            rows: state.rows.clone(),
        })
    }

    async fn optimize_partition(
        &mut self,
        table: &str,
        partition_id: &str,
    ) -> Result<(), EngineError> {
        let mut state = self.engine.state.lock().unwrap();
        state
            .merges
            .push((table.to_string(), partition_id.to_string()));
        if let Some((n, token)) = &state.cancel_after_merges {
            if state.merges.len() == *n {
                token.cancel();
            }
        }
        match state.merge_errors.get(partition_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
