//! Full index driver and the shared document sink.
//!
//! [`FullIndexer`] is the sink every producer appends to. It forwards
//! documents to the storage backend and reflects each append into the
//! [`FullIndexerStatus`] counters. [`FullIndexer::run`] drives one
//! complete run over every registered indexer.

use crate::core::context::SearchResourceContext;
use crate::core::error::{IndexerError, Result};
use crate::core::indexer::pool::FolderIndexerWorkerPool;
use crate::core::indexer::producer::IndexerRegistry;
use crate::core::indexer::status::{FullIndexerStatus, StatusSnapshot};
use crate::core::storage::IndexBackend;
use crate::core::types::IndexDocument;
use std::sync::Arc;

/// Write-only destination for documents.
///
/// Implementations must accept concurrent appends from several workers;
/// callers must not rely on the order in which documents arrive.
pub trait DocumentSink: Send + Sync {
    fn add_document(&self, document: IndexDocument) -> Result<()>;
}

/// Drives full index runs and counts every appended document
#[derive(Clone)]
pub struct FullIndexer {
    backend: Arc<dyn IndexBackend>,
    status: Arc<FullIndexerStatus>,
    pool: Arc<FolderIndexerWorkerPool>,
}

impl FullIndexer {
    pub fn new(
        backend: Arc<dyn IndexBackend>,
        status: Arc<FullIndexerStatus>,
        pool: Arc<FolderIndexerWorkerPool>,
    ) -> Self {
        Self {
            backend,
            status,
            pool,
        }
    }

    pub fn status(&self) -> &Arc<FullIndexerStatus> {
        &self.status
    }

    /// Run every registered indexer, wait for pooled workers and commit.
    ///
    /// An interruption cancels the pool, skips the commit and is returned
    /// after the status has been moved to `Finished`. A [`FullIndexer::stop`]
    /// issued before the run starts makes it return `Interrupted` at once. Other producer
    /// failures are logged and the run continues with the next indexer.
    pub fn run(&self, registry: &IndexerRegistry) -> Result<StatusSnapshot> {
        if registry.len() > self.status.number_of_parts() {
            return Err(IndexerError::ConfigError(format!(
                "{} indexers registered but only {} partial indexer counters configured",
                registry.len(),
                self.status.number_of_parts()
            )));
        }

        // A stop requested before the run began is consumed here
        if self.pool.is_cancelled() {
            self.pool.reset();
            return Err(IndexerError::Interrupted(
                "full index was stopped before it started".to_string(),
            ));
        }

        self.status.indexing_started();

        let root = SearchResourceContext::root();
        let mut outcome: Result<()> = Ok(());

        for (part, indexer) in registry.indexers().iter().enumerate() {
            let sink: Arc<dyn DocumentSink> = Arc::new(PartSink {
                indexer: self.clone(),
                part,
            });

            tracing::info!(
                "Running indexer '{}' (part {})",
                indexer.supported_type_name(),
                part
            );

            match indexer.do_index(&root, &sink) {
                Ok(()) => {}
                Err(e) if e.is_interrupted() => {
                    self.pool.cancel();
                    outcome = Err(e);
                    break;
                }
                Err(e) => {
                    tracing::error!(
                        "Indexer '{}' failed: {}",
                        indexer.supported_type_name(),
                        e
                    );
                }
            }
        }

        let awaited = self.pool.await_completion();
        self.pool.reset();
        match (&outcome, awaited) {
            (Ok(()), Err(e)) => outcome = Err(e),
            (Err(_), Err(e)) => tracing::warn!("Worker ended with error after abort: {}", e),
            _ => {}
        }

        let outcome = match outcome {
            Ok(()) => self.backend.commit(),
            Err(e) => {
                tracing::warn!("Full index aborted, index not committed: {}", e);
                Err(e)
            }
        };

        self.status.indexing_finished()?;
        outcome?;
        self.status.snapshot()
    }

    /// Cancel a running full index (best effort for in-flight workers)
    pub fn stop(&self) {
        tracing::info!("Stopping full index");
        self.pool.cancel();
    }

    fn add_part_document(&self, part: Option<usize>, document: IndexDocument) -> Result<()> {
        if self.pool.is_cancelled() {
            return Err(IndexerError::Interrupted(
                "full index was stopped".to_string(),
            ));
        }

        let document_type = document.document_type.clone();
        let file_type = document.file_type.clone();

        self.status.queue_entered();
        let added = self.backend.add(document);
        self.status.queue_left();
        added?;

        self.status.increment_document_count();
        if let Some(part) = part {
            self.status.increment_part_document_count(part);
        }
        self.status.increment_document_type(&document_type);
        if let Some(file_type) = file_type {
            self.status.increment_file_type(&file_type);
        }
        Ok(())
    }
}

impl DocumentSink for FullIndexer {
    fn add_document(&self, document: IndexDocument) -> Result<()> {
        self.add_part_document(None, document)
    }
}

/// Sink handed to one registered indexer; counts into its part counter
struct PartSink {
    indexer: FullIndexer,
    part: usize,
}

impl DocumentSink for PartSink {
    fn add_document(&self, document: IndexDocument) -> Result<()> {
        self.indexer.add_part_document(Some(self.part), document)
    }
}
