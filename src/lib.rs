//! olat-search - concurrent full-text indexing for a learning-management system
//!
//! A full index run walks every registered resource producer, turns folder
//! trees, context help pages and portfolio maps into flat documents and
//! appends them to a BM25 index via Tantivy. Hits are access-checked again
//! at query time by the producer that owns their document type.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg, context
//!   - vfs (container/leaf trees)
//!   - indexer (status, worker pool, folder walker, producers, full run)
//!   - storage (Tantivy index, index metadata)
//!   - search (BM25 queries with access filtering)
//!   - services (shared pool, status and registry wiring)
//!
//! - **cli**: clap adapter for `olat-index` (depends on core)

pub mod cli;
pub mod core;

pub use core::config::Config;
pub use core::error::{IndexerError, Result};
pub use core::services::Services;
pub use core::types::*;
