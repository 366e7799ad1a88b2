//! Virtual file system abstraction walked by the folder indexer.
//!
//! A tree consists of containers and leaves. Containers list their
//! children in natural iteration order; children are handed out as
//! `Arc`s and live only as long as the traversal needs them.
//!
//! - **local**: directories and files on disk
//! - **memory**: in-memory trees for synthetic content and tests

pub mod local;
pub mod memory;

pub use local::{LocalContainer, LocalLeaf};
pub use memory::{MemoryContainer, MemoryLeaf};

use crate::core::error::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Access metadata attached to every item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemMetadata {
    /// Item is hidden from regular users (e.g. dot files)
    pub hidden: bool,
    /// Item may be read but not changed
    pub read_only: bool,
}

/// A node that owns children
pub trait VfsContainer: Send + Sync {
    fn name(&self) -> &str;

    /// Children in the container's natural iteration order
    fn items(&self) -> Result<Vec<VfsItem>>;

    fn metadata(&self) -> ItemMetadata {
        ItemMetadata::default()
    }
}

/// A file-like node with content
pub trait VfsLeaf: Send + Sync {
    fn name(&self) -> &str;

    /// Content size in bytes
    fn size(&self) -> u64;

    fn last_modified(&self) -> Option<DateTime<Utc>>;

    fn read_bytes(&self) -> Result<Vec<u8>>;

    fn metadata(&self) -> ItemMetadata {
        ItemMetadata::default()
    }

    /// Lower-cased suffix after the last dot, if any
    fn extension(&self) -> Option<String> {
        let name = self.name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// A child of a container
#[derive(Clone)]
pub enum VfsItem {
    Container(Arc<dyn VfsContainer>),
    Leaf(Arc<dyn VfsLeaf>),
}

impl VfsItem {
    pub fn name(&self) -> &str {
        match self {
            VfsItem::Container(c) => c.name(),
            VfsItem::Leaf(l) => l.name(),
        }
    }

    pub fn metadata(&self) -> ItemMetadata {
        match self {
            VfsItem::Container(c) => c.metadata(),
            VfsItem::Leaf(l) => l.metadata(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, VfsItem::Container(_))
    }
}

impl fmt::Debug for VfsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VfsItem::Container(c) => f.debug_tuple("Container").field(&c.name()).finish(),
            VfsItem::Leaf(l) => f.debug_tuple("Leaf").field(&l.name()).finish(),
        }
    }
}
