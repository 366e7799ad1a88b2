//! In-memory container trees.

use super::{ItemMetadata, VfsContainer, VfsItem, VfsLeaf};
use crate::core::error::{IndexerError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// In-memory container built with a small builder API
#[derive(Debug, Default)]
pub struct MemoryContainer {
    name: String,
    children: Vec<MemoryChild>,
    metadata: ItemMetadata,
}

#[derive(Debug)]
enum MemoryChild {
    Container(Arc<MemoryContainer>),
    Leaf(Arc<MemoryLeaf>),
}

impl MemoryContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a text file
    pub fn with_file(self, name: &str, content: &str) -> Self {
        self.with_leaf(MemoryLeaf::new(name, content))
    }

    pub fn with_leaf(mut self, leaf: MemoryLeaf) -> Self {
        self.children.push(MemoryChild::Leaf(Arc::new(leaf)));
        self
    }

    pub fn with_container(mut self, container: MemoryContainer) -> Self {
        self.children
            .push(MemoryChild::Container(Arc::new(container)));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.metadata.hidden = true;
        self
    }

    /// Share the finished tree for indexing
    pub fn into_shared(self) -> Arc<dyn VfsContainer> {
        Arc::new(self)
    }
}

impl VfsContainer for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn items(&self) -> Result<Vec<VfsItem>> {
        Ok(self
            .children
            .iter()
            .map(|child| match child {
                MemoryChild::Container(c) => VfsItem::Container(c.clone()),
                MemoryChild::Leaf(l) => VfsItem::Leaf(l.clone()),
            })
            .collect())
    }

    fn metadata(&self) -> ItemMetadata {
        self.metadata
    }
}

/// In-memory leaf
#[derive(Debug, Clone)]
pub struct MemoryLeaf {
    name: String,
    content: Vec<u8>,
    last_modified: Option<DateTime<Utc>>,
    metadata: ItemMetadata,
    unreadable: bool,
}

impl MemoryLeaf {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            last_modified: None,
            metadata: ItemMetadata::default(),
            unreadable: false,
        }
    }

    /// Leaf whose content cannot be read (access denied)
    pub fn unreadable(name: impl Into<String>) -> Self {
        Self {
            unreadable: true,
            ..Self::new(name, Vec::new())
        }
    }

    pub fn modified_at(mut self, when: DateTime<Utc>) -> Self {
        self.last_modified = Some(when);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.metadata.hidden = true;
        self
    }
}

impl VfsLeaf for MemoryLeaf {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.content.len() as u64
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        if self.unreadable {
            return Err(IndexerError::AccessDenied(format!(
                "cannot read {}",
                self.name
            )));
        }
        Ok(self.content.clone())
    }

    fn metadata(&self) -> ItemMetadata {
        self.metadata
    }
}
