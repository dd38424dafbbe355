use super::errors::{EngineError, ErrorKind};

/// Maps an engine error to the failure class the executor acts on.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, err: &EngineError) -> ErrorKind;
}

/// `CANNOT_ASSIGN_OPTIMIZE`, raised with `optimize_throw_if_noop = 1`.
pub const CANNOT_ASSIGN_OPTIMIZE: u32 = 388;
pub const ALREADY_MERGING_MARKER: &str = "has already been assigned a merge into";

/// ClickHouse reports a concurrent merge as code 388 whose message names the
/// part that is already assigned. Code 388 alone is not enough: it is also
/// raised when there is simply nothing to merge.
#[derive(Debug, Clone)]
pub struct ClickHouseClassifier {
    conflict_code: u32,
    conflict_marker: String,
}

impl ClickHouseClassifier {
    pub fn new(conflict_code: u32, conflict_marker: impl Into<String>) -> Self {
        Self {
            conflict_code,
            conflict_marker: conflict_marker.into(),
        }
    }
}

impl Default for ClickHouseClassifier {
    fn default() -> Self {
        Self::new(CANNOT_ASSIGN_OPTIMIZE, ALREADY_MERGING_MARKER)
    }
}

impl ErrorClassifier for ClickHouseClassifier {
    fn classify(&self, err: &EngineError) -> ErrorKind {
        match err {
            EngineError::Server { code, message, .. }
                if *code == self.conflict_code && message.contains(&self.conflict_marker) =>
            {
                ErrorKind::MergeConflict
            }
            EngineError::Server { .. } => ErrorKind::Vendor,
            EngineError::Transport(_) => ErrorKind::Transport,
            EngineError::Decode(_) => ErrorKind::Decode,
        }
    }
}
