//! Unified service container
//!
//! Owns the process-wide indexing state (worker pool, file document
//! factory, run status) and builds the indexers that share it.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::indexer::access::{default_folder_rule, AccessRule};
use crate::core::indexer::context_help::{ContextHelpIndexer, DirectoryHelpSource};
use crate::core::indexer::file_document::FileDocumentFactory;
use crate::core::indexer::folder::FolderIndexer;
use crate::core::indexer::folder_resource::FolderResourceIndexer;
use crate::core::indexer::full::FullIndexer;
use crate::core::indexer::pool::FolderIndexerWorkerPool;
use crate::core::indexer::portfolio::{MapKind, MemoryPortfolioSource, PortfolioMapIndexer};
use crate::core::indexer::producer::IndexerRegistry;
use crate::core::indexer::status::FullIndexerStatus;
use crate::core::storage::{IndexBackend, IndexSources, IndexStore};
use crate::core::vfs::LocalContainer;
use std::sync::Arc;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,

    /// Worker pool shared by every folder walk
    pub pool: Arc<FolderIndexerWorkerPool>,

    /// File parsing and exclusion counting
    pub file_documents: Arc<FileDocumentFactory>,

    /// Status of the current or last full index
    pub status: Arc<FullIndexerStatus>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Self {
        let pool = Arc::new(FolderIndexerWorkerPool::new(&config.indexing));
        let file_documents = Arc::new(FileDocumentFactory::new(&config.indexing));
        let status = Arc::new(FullIndexerStatus::new(
            config.indexing.partial_indexers,
            Arc::clone(&file_documents),
        ));

        Self {
            config: Arc::new(config),
            pool,
            file_documents,
            status,
        }
    }

    pub fn folder_indexer(&self) -> FolderIndexer {
        FolderIndexer::new(Arc::clone(&self.pool), Arc::clone(&self.file_documents))
    }

    /// A run driver appending to `backend`
    pub fn full_indexer(&self, backend: Arc<dyn IndexBackend>) -> FullIndexer {
        FullIndexer::new(backend, Arc::clone(&self.status), Arc::clone(&self.pool))
    }

    pub fn index_store(&self) -> IndexStore {
        IndexStore::new(self.config.storage.index_dir.clone())
    }

    /// Folder access rule: configured excludes plus `extra`
    pub fn folder_rule(&self, extra: &[String]) -> Result<Arc<dyn AccessRule>> {
        let mut patterns = self.config.indexing.exclude_patterns.clone();
        patterns.extend(extra.iter().cloned());
        default_folder_rule(&patterns)
    }

    /// Register one indexer per configured source.
    ///
    /// Registration order is part order: folder, context help, then the
    /// three portfolio map kinds.
    pub fn build_registry(&self, sources: &IndexSources) -> Result<IndexerRegistry> {
        let mut registry = IndexerRegistry::new();

        if let Some(root) = &sources.root {
            let container = LocalContainer::open(root)?;
            let indexer = FolderResourceIndexer::new(
                Arc::new(container),
                self.folder_indexer(),
                self.folder_rule(&sources.exclude_patterns)?,
            );
            registry.register(Arc::new(indexer))?;
        }

        if let Some(help_dir) = &sources.help_dir {
            let indexer = ContextHelpIndexer::new(
                Arc::new(DirectoryHelpSource::new(help_dir)),
                self.config.help.enabled_locales.clone(),
            );
            registry.register(Arc::new(indexer))?;
        }

        if let Some(portfolio_file) = &sources.portfolio_file {
            let source = Arc::new(MemoryPortfolioSource::from_json_file(portfolio_file)?);
            for kind in MapKind::ALL {
                registry.register(Arc::new(PortfolioMapIndexer::new(
                    kind,
                    source.clone(),
                    self.config.indexing.batch_size,
                )))?;
            }
        }

        Ok(registry)
    }
}
