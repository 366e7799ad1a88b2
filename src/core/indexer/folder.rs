//! Folder tree walker.
//!
//! Visits a container tree depth-first, pre-order, leaves in the
//! container's natural order. The access rule is consulted before
//! descending into a container and before indexing a leaf. When the
//! worker pool is enabled, the root's leaves are indexed on the calling
//! thread and every accepted child container gets its own pooled worker,
//! so sibling subtrees are walked in parallel. Otherwise the whole walk
//! runs on the calling thread.
//!
//! Per-leaf failures are logged and skipped. Only an interruption
//! propagates and aborts the rest of the branch.

use crate::core::context::SearchResourceContext;
use crate::core::error::{IndexerError, Result};
use crate::core::indexer::access::AccessRule;
use crate::core::indexer::file_document::FileDocumentFactory;
use crate::core::indexer::full::DocumentSink;
use crate::core::indexer::pool::FolderIndexerWorkerPool;
use crate::core::vfs::{VfsContainer, VfsItem, VfsLeaf};
use std::sync::Arc;

/// Walks container trees and turns accepted leaves into documents
#[derive(Clone)]
pub struct FolderIndexer {
    pool: Arc<FolderIndexerWorkerPool>,
    documents: Arc<FileDocumentFactory>,
}

impl FolderIndexer {
    pub fn new(pool: Arc<FolderIndexerWorkerPool>, documents: Arc<FileDocumentFactory>) -> Self {
        Self { pool, documents }
    }

    pub fn pool(&self) -> &Arc<FolderIndexerWorkerPool> {
        &self.pool
    }

    /// Index a container tree, fanning child containers out to the pool.
    ///
    /// With a pool, this returns once the root's leaves are indexed and its
    /// subtrees are dispatched; the driver collects the outcome with
    /// [`FolderIndexerWorkerPool::await_completion`]. A subtree that finds
    /// every worker busy past the acquire timeout is walked inline.
    pub fn index_vfs_container(
        &self,
        parent_context: &SearchResourceContext,
        container: Arc<dyn VfsContainer>,
        sink: Arc<dyn DocumentSink>,
        file_path: &str,
        access_rule: Arc<dyn AccessRule>,
    ) -> Result<()> {
        if self.pool.is_disabled() {
            return self.do_index_vfs_container_by_myself(
                parent_context,
                container.as_ref(),
                sink.as_ref(),
                file_path,
                access_rule.as_ref(),
            );
        }

        let items = match container.items() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Cannot list container '{}': {}", container.name(), e);
                return Ok(());
            }
        };

        for item in items {
            if !access_rule.allowed(&item) {
                tracing::debug!("Access rule rejected '{}/{}'", file_path, item.name());
                continue;
            }

            match item {
                VfsItem::Container(child) => {
                    let child_path = format!("{}/{}", file_path, child.name());
                    self.dispatch_container(parent_context, child, &sink, child_path, &access_rule)?;
                }
                VfsItem::Leaf(leaf) => {
                    self.do_index_vfs_leaf(parent_context, leaf.as_ref(), sink.as_ref(), file_path)?;
                }
            }
        }

        Ok(())
    }

    fn dispatch_container(
        &self,
        parent_context: &SearchResourceContext,
        container: Arc<dyn VfsContainer>,
        sink: &Arc<dyn DocumentSink>,
        file_path: String,
        access_rule: &Arc<dyn AccessRule>,
    ) -> Result<()> {
        let worker = match self.pool.get_indexer() {
            Ok(worker) => worker,
            Err(IndexerError::PoolExhausted(msg)) => {
                tracing::warn!("{}; walking '{}' on the calling thread", msg, file_path);
                return self.do_index_vfs_container_by_myself(
                    parent_context,
                    container.as_ref(),
                    sink.as_ref(),
                    &file_path,
                    access_rule.as_ref(),
                );
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(
            "Dispatching container '{}' to folder indexer {}",
            file_path,
            worker.id()
        );

        let walker = self.clone();
        let context = parent_context.child();
        let sink = Arc::clone(sink);
        let access_rule = Arc::clone(access_rule);
        worker.start(move || {
            walker.do_index_vfs_container_by_myself(
                &context,
                container.as_ref(),
                sink.as_ref(),
                &file_path,
                access_rule.as_ref(),
            )
        })
    }

    /// Walk a container on the calling thread
    pub fn do_index_vfs_container_by_myself(
        &self,
        parent_context: &SearchResourceContext,
        container: &dyn VfsContainer,
        sink: &dyn DocumentSink,
        file_path: &str,
        access_rule: &dyn AccessRule,
    ) -> Result<()> {
        let items = match container.items() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Cannot list container '{}': {}", container.name(), e);
                return Ok(());
            }
        };

        for item in items {
            if !access_rule.allowed(&item) {
                tracing::debug!("Access rule rejected '{}/{}'", file_path, item.name());
                continue;
            }

            match &item {
                VfsItem::Container(child) => {
                    let child_path = format!("{}/{}", file_path, child.name());
                    self.do_index_vfs_container_by_myself(
                        parent_context,
                        child.as_ref(),
                        sink,
                        &child_path,
                        access_rule,
                    )?;
                }
                VfsItem::Leaf(leaf) => {
                    self.do_index_vfs_leaf(parent_context, leaf.as_ref(), sink, file_path)?;
                }
            }
        }

        Ok(())
    }

    /// Turn one leaf into at most one document
    pub fn do_index_vfs_leaf(
        &self,
        parent_context: &SearchResourceContext,
        leaf: &dyn VfsLeaf,
        sink: &dyn DocumentSink,
        file_path: &str,
    ) -> Result<()> {
        if self.pool.is_cancelled() {
            return Err(IndexerError::Interrupted(format!(
                "stopped before {}/{}",
                file_path,
                leaf.name()
            )));
        }

        if !self.documents.is_file_supported(leaf) {
            tracing::debug!("Unsupported file type: {}/{}", file_path, leaf.name());
            return Ok(());
        }

        let mut leaf_context = parent_context.child();
        leaf_context.set_file_path(format!("{}/{}", file_path, leaf.name()));

        let result = self
            .documents
            .create_document(&leaf_context, leaf)
            .and_then(|document| sink.add_document(document));

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_interrupted() => Err(e),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping {}/{}: {}", file_path, leaf.name(), e);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Could not index {}/{}: {}", file_path, leaf.name(), e);
                Ok(())
            }
        }
    }
}
