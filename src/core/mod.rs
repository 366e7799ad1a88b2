//! Core indexing and search logic
//!
//! Everything here is independent of the command line front end.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Documents, identities, search results
//! - **context**: Resource context and business paths
//! - **vfs**: Container/leaf abstraction over indexable trees
//! - **indexer**: Producers, folder walker, worker pool, run status
//! - **storage**: Tantivy and in-memory document stores
//! - **search**: BM25 search with access filtering
//! - **services**: Unified service container
//! - **xdg**: XDG directory handling

pub mod config;
pub mod context;
pub mod error;
pub mod indexer;
pub mod search;
pub mod services;
pub mod storage;
pub mod types;
pub mod vfs;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{IndexerError, Result};
pub use services::Services;
