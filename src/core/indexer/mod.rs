//! Full-text indexing pipeline.
//!
//! A full index run asks every registered [`Indexer`] for its documents
//! and appends them to one shared sink. Key pieces:
//!
//! - **producer**: the `Indexer` capability and the registry
//! - **folder**: depth-first walker over container trees
//! - **pool**: bounded worker pool the walker hands subtrees to
//! - **status**: process-wide counters of the current run
//! - **full**: run driver and the counting document sink
//!
//! Producers: context help pages, portfolio maps and folder resources.

pub mod access;
pub mod context_help;
pub mod file_document;
pub mod folder;
pub mod folder_resource;
pub mod full;
pub mod pool;
pub mod portfolio;
pub mod producer;
pub mod status;

pub use access::{default_folder_rule, AccessRule, AllOf, AllowAll, ExcludePatterns, SkipHidden};
pub use context_help::{
    ContextHelpIndexer, DirectoryHelpSource, HelpPage, HelpPageSource, StaticHelpSource,
    CONTEXT_HELP_TYPE,
};
pub use file_document::FileDocumentFactory;
pub use folder::FolderIndexer;
pub use folder_resource::{FolderResourceIndexer, FOLDER_DOCUMENT_TYPE};
pub use full::{DocumentSink, FullIndexer};
pub use pool::{FolderIndexerWorker, FolderIndexerWorkerPool};
pub use portfolio::{
    MapKind, MemoryPortfolioSource, PortfolioMap, PortfolioMapIndexer, PortfolioMapSource,
};
pub use producer::{Indexer, IndexerRegistry};
pub use status::{FullIndexerStatus, IndexerState, StatusSnapshot};
