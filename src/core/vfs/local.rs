//! Directory-backed containers.
//!
//! Children are listed one level at a time, sorted by file name so that
//! the natural iteration order is stable across runs. Symlinks are not
//! followed.

use super::{ItemMetadata, VfsContainer, VfsItem, VfsLeaf};
use crate::core::error::{IndexerError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// A directory on disk
#[derive(Debug, Clone)]
pub struct LocalContainer {
    path: PathBuf,
    name: String,
}

impl LocalContainer {
    /// Open a directory as a container
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(IndexerError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory: {}", path.display()),
            )));
        }
        Ok(Self::from_path(path.to_path_buf()))
    }

    fn from_path(path: PathBuf) -> Self {
        let name = file_name(&path);
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VfsContainer for LocalContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn items(&self) -> Result<Vec<VfsItem>> {
        let mut items = Vec::new();

        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    let path = entry.into_path();
                    if file_type.is_dir() {
                        items.push(VfsItem::Container(Arc::new(LocalContainer::from_path(
                            path,
                        ))));
                    } else if file_type.is_file() {
                        items.push(VfsItem::Leaf(Arc::new(LocalLeaf::from_path(path))));
                    } else {
                        tracing::debug!("Skipping special file: {:?}", path);
                    }
                }
                Err(e) => {
                    // Continue listing despite errors
                    tracing::warn!("Walk error in {:?}: {}", self.path, e);
                }
            }
        }

        Ok(items)
    }

    fn metadata(&self) -> ItemMetadata {
        local_metadata(&self.path, &self.name)
    }
}

/// A regular file on disk
#[derive(Debug, Clone)]
pub struct LocalLeaf {
    path: PathBuf,
    name: String,
}

impl LocalLeaf {
    fn from_path(path: PathBuf) -> Self {
        let name = file_name(&path);
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VfsLeaf for LocalLeaf {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| leaf_read_error(&self.path, e))
    }

    fn metadata(&self) -> ItemMetadata {
        local_metadata(&self.path, &self.name)
    }
}

fn leaf_read_error(path: &Path, e: io::Error) -> IndexerError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            IndexerError::AccessDenied(format!("{}: {e}", path.display()))
        }
        io::ErrorKind::Unsupported => {
            IndexerError::NotImplemented(format!("{}: {e}", path.display()))
        }
        _ => IndexerError::IoError(e),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn local_metadata(path: &Path, name: &str) -> ItemMetadata {
    let read_only = fs::metadata(path)
        .map(|m| m.permissions().readonly())
        .unwrap_or(false);
    ItemMetadata {
        hidden: name.starts_with('.'),
        read_only,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_files(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for file in files {
            let path = temp_dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "test content").unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_items_sorted_by_name() {
        let temp_dir = create_test_files(&["b.txt", "a.txt", "sub/c.txt"]);
        let root = LocalContainer::open(temp_dir.path()).unwrap();

        let names: Vec<String> = root
            .items()
            .unwrap()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
    }

    #[test]
    fn test_only_direct_children() {
        let temp_dir = create_test_files(&["sub/deep/c.txt"]);
        let root = LocalContainer::open(temp_dir.path()).unwrap();

        let items = root.items().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_container());
    }

    #[test]
    fn test_leaf_reads_content() {
        let temp_dir = create_test_files(&["a.txt"]);
        let root = LocalContainer::open(temp_dir.path()).unwrap();

        match &root.items().unwrap()[0] {
            VfsItem::Leaf(leaf) => {
                assert_eq!(leaf.read_bytes().unwrap(), b"test content");
                assert_eq!(leaf.size(), 12);
                assert!(leaf.last_modified().is_some());
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_hidden_metadata_from_dot_prefix() {
        let temp_dir = create_test_files(&[".git/config"]);
        let root = LocalContainer::open(temp_dir.path()).unwrap();

        let items = root.items().unwrap();
        assert!(items[0].metadata().hidden);
    }

    #[test]
    fn test_open_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = LocalContainer::open(temp_dir.path().join("missing"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_errors_are_classified() {
        let path = Path::new("/srv/course/a.txt");
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let unsupported = io::Error::new(io::ErrorKind::Unsupported, "no reader");
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");

        assert!(matches!(
            leaf_read_error(path, denied),
            IndexerError::AccessDenied(_)
        ));
        assert!(matches!(
            leaf_read_error(path, unsupported),
            IndexerError::NotImplemented(_)
        ));
        let missing = leaf_read_error(path, missing);
        assert!(matches!(missing, IndexerError::IoError(_)));
        assert!(missing.is_recoverable());
    }
}
