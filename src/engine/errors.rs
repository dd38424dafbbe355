use thiserror::Error;
use tracing::{debug, error};

/// Driver-neutral error reported by an engine session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Exception raised by the server while executing a statement.
    #[error("[{code}] {name}: {message}")]
    Server {
        code: u32,
        name: String,
        message: String,
        stack_trace: String,
    },

    /// Connection, I/O, DSN or protocol failure below the SQL layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// Result set did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl EngineError {
    pub fn server(code: u32, message: impl Into<String>) -> Self {
        EngineError::Server {
            code,
            name: String::new(),
            message: message.into(),
            stack_trace: String::new(),
        }
    }

    /// Vendor code and message, when the server produced this error.
    pub fn vendor_parts(&self) -> Option<(u32, &str)> {
        match self {
            EngineError::Server { code, message, .. } => Some((*code, message.as_str())),
            _ => None,
        }
    }

    pub fn log_error(&self, context: &str) {
        match self {
            EngineError::Server {
                code,
                name,
                message,
                stack_trace,
            } => {
                error!(target: "ch_optimizer::engine", code, name = %name, "{}: [{}] {}", context, code, message);
                if !stack_trace.is_empty() {
                    error!(target: "ch_optimizer::engine", code, "Server stack trace:\n{}", stack_trace);
                }
            }
            EngineError::Transport(e) => {
                error!(target: "ch_optimizer::engine", "{}: {}", context, e);
            }
            EngineError::Decode(e) => {
                error!(target: "ch_optimizer::engine", "{}: {}", context, e);
                debug!(target: "ch_optimizer::engine", "Decode error details: {:?}", self);
            }
        }
    }
}

/// Abstract failure classes used to decide a merge outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The partition is already being merged by the engine or another actor.
    MergeConflict,
    /// Any other server-side exception.
    Vendor,
    Transport,
    Decode,
}

/// Errors that end a cycle early.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("ClickHouse server is unreachable: {0}")]
    Connect(EngineError),

    #[error("Failed to select partitions to merge: {0}")]
    Query(EngineError),
}

impl CycleError {
    pub fn is_connect(&self) -> bool {
        matches!(self, CycleError::Connect(_))
    }

    pub fn log_error(&self) {
        match self {
            CycleError::Connect(e) => e.log_error("Ping ClickHouse server failed"),
            CycleError::Query(e) => e.log_error("Optimization round failed"),
        }
    }
}
