//! Error types for the indexing core.
//!
//! Errors fall into three groups that callers treat differently:
//!
//! - per-leaf recoverable errors (unsupported format, access denied,
//!   document construction, I/O): logged, the item is skipped
//! - cooperative cancellation (`Interrupted`): always propagated
//! - configuration, pool and precondition errors: returned to the
//!   operator that started the run

use thiserror::Error;

/// Result type alias for indexing operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Main error type for the indexing core
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Indexing interrupted: {0}")]
    Interrupted(String),

    #[error("Worker pool exhausted: {0}")]
    PoolExhausted(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Document creation failed: {0}")]
    DocumentFailed(String),

    #[error("Indexer status queried before indexing was started")]
    StatusNotStarted,

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Index error: {0}")]
    TantivyError(#[from] tantivy::TantivyError),
}

impl IndexerError {
    /// Cooperative cancellation; must be re-raised, never swallowed
    pub fn is_interrupted(&self) -> bool {
        matches!(self, IndexerError::Interrupted(_))
    }

    /// Errors that only cost a single item and let the walk continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IndexerError::AccessDenied(_)
                | IndexerError::NotImplemented(_)
                | IndexerError::UnsupportedDocument(_)
                | IndexerError::DocumentFailed(_)
                | IndexerError::IoError(_)
        )
    }
}
