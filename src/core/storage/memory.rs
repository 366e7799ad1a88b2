//! In-memory document store.

use crate::core::error::Result;
use crate::core::indexer::full::DocumentSink;
use crate::core::storage::IndexBackend;
use crate::core::types::IndexDocument;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Keeps appended documents in arrival order
#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: Mutex<Vec<IndexDocument>>,
    commits: AtomicUsize,
}

impl MemoryIndex {
    /// Copy of every document appended so far
    pub fn documents(&self) -> Vec<IndexDocument> {
        self.documents.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl IndexBackend for MemoryIndex {
    fn add(&self, document: IndexDocument) -> Result<()> {
        self.documents.lock().push(document);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl DocumentSink for MemoryIndex {
    fn add_document(&self, document: IndexDocument) -> Result<()> {
        self.add(document)
    }
}
