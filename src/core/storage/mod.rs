//! Storage layer for the full-text index.
//!
//! Documents produced by a full index run are appended to an
//! [`IndexBackend`]. Two backends exist:
//!
//! - **TantivyIndex**: BM25 index on disk (or in RAM for tests)
//! - **MemoryIndex**: plain document list, used for dry runs and tests
//!
//! # Index Directory Structure
//!
//! ```text
//! {index_dir}/
//! ├── meta.json           # Index metadata and last run status
//! └── tantivy/            # Tantivy index
//!     ├── meta.json
//!     └── [segment files]
//! ```

mod memory;
mod meta;
mod tantivy;

use crate::core::error::Result;
use crate::core::types::IndexDocument;

pub use memory::MemoryIndex;
pub use meta::{IndexBuild, IndexMeta, IndexSources, IndexStore};
pub use self::tantivy::{create_schema, IndexFields, TantivyIndex, SCHEMA_VERSION};

/// Append-only document store behind a full index run.
///
/// `add` is called concurrently from folder indexer workers.
pub trait IndexBackend: Send + Sync {
    fn add(&self, document: IndexDocument) -> Result<()>;

    /// Make every added document visible to readers
    fn commit(&self) -> Result<()>;
}
