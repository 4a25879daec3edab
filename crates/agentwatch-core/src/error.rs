//! Error types for agentwatch.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AgentwatchError {
    #[error("Worker not found: {0}")]
    WorkerNotFound(Uuid),

    #[error("Worker already exists: {0}")]
    WorkerAlreadyExists(Uuid),

    #[error("Worker limit exceeded: max {0} tracked workers")]
    WorkerLimitExceeded(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
