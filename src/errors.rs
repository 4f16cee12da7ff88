//! Error types for the subgraph retriever
//!
//! Configuration and dimensionality errors are caller bugs and abort a whole
//! batch; graph, timeout and cancellation errors are scoped to one query.
//! An empty retrieval is not an error (see `RetrievalOutcome::Empty`).

use thiserror::Error;

/// Main error type for retrieval operations
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Query and graph embeddings have different lengths
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Retrieval configuration rejected before any per-query work
    #[error("Invalid retrieval configuration: {0}")]
    InvalidConfig(String),

    /// Graph references missing ids or carries invalid values
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    /// Per-query wall-clock bound exceeded
    #[error("Query timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Query abandoned before the solver started
    #[error("Query cancelled before solving")]
    Cancelled,

    /// Worker task panicked or was aborted
    #[error("Worker failed: {0}")]
    WorkerFailed(String),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("Retrieval error: {0}")]
    Generic(String),
}

impl RetrievalError {
    /// Errors that indicate a caller bug and abort an entire batch
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            RetrievalError::InvalidConfig(_) | RetrievalError::DimensionMismatch { .. }
        )
    }
}

/// Result type alias for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Convert anyhow errors to RetrievalError
impl From<anyhow::Error> for RetrievalError {
    fn from(err: anyhow::Error) -> Self {
        RetrievalError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RetrievalError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert!(err.to_string().contains("384"));
        assert!(err.to_string().contains("768"));
    }

    #[test]
    fn test_batch_fatal_classification() {
        assert!(RetrievalError::InvalidConfig("topk".to_string()).is_batch_fatal());
        assert!(RetrievalError::DimensionMismatch { expected: 2, actual: 3 }.is_batch_fatal());
        assert!(!RetrievalError::Timeout { duration_ms: 10 }.is_batch_fatal());
        assert!(!RetrievalError::MalformedGraph("edge 3".to_string()).is_batch_fatal());
        assert!(!RetrievalError::Cancelled.is_batch_fatal());
    }

    #[test]
    fn test_from_anyhow() {
        let err: RetrievalError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, RetrievalError::Generic(ref m) if m == "boom"));
    }
}
