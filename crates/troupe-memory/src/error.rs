//! Error types for memory operations.

/// Errors returned by the structured store and semantic index.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Embedding generation failed.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// The vector index rejected an operation.
    #[error("index error: {0}")]
    Index(String),
}
