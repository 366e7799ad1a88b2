//! Index directory management.
//!
//! An index directory holds the Tantivy index and a `meta.json`
//! describing what was indexed and how the last full run went.

use crate::core::error::{IndexerError, Result};
use crate::core::indexer::status::StatusSnapshot;
use crate::core::storage::tantivy::{TantivyIndex, SCHEMA_VERSION};
use crate::core::storage::IndexBackend;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// What a full index run reads from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSources {
    /// Folder tree indexed as a folder resource
    pub root: Option<PathBuf>,
    /// Context help page directory
    pub help_dir: Option<PathBuf>,
    /// JSON file with portfolio maps
    pub portfolio_file: Option<PathBuf>,
    /// Exclude patterns added to the configured ones
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Index metadata (Schema v2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub sources: IndexSources,
    pub created_at: DateTime<Utc>,
    pub last_indexed_at: Option<DateTime<Utc>>,
    pub index_size_bytes: u64,
    pub schema_version: u32,
    /// Status of the last completed full index
    pub last_status: Option<StatusSnapshot>,
}

impl IndexMeta {
    pub fn new(sources: IndexSources) -> Self {
        Self {
            sources,
            created_at: Utc::now(),
            last_indexed_at: None,
            index_size_bytes: 0,
            schema_version: SCHEMA_VERSION,
            last_status: None,
        }
    }
}

/// Owns one index directory
#[derive(Debug, Clone)]
pub struct IndexStore {
    index_dir: PathBuf,
}

impl IndexStore {
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
        }
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    fn tantivy_dir(&self) -> PathBuf {
        self.index_dir.join("tantivy")
    }

    fn meta_path(&self) -> PathBuf {
        self.index_dir.join("meta.json")
    }

    pub fn exists(&self) -> bool {
        self.meta_path().exists()
    }

    /// Start building a fresh index next to the live one.
    ///
    /// An existing index is only replaced with `force`, and only once
    /// [`IndexBuild::publish`] is called after a successful run. Until then
    /// the live index stays untouched and readable.
    pub fn create(&self, meta: &IndexMeta, force: bool) -> Result<IndexBuild> {
        if self.exists() && !force {
            return Err(IndexerError::IndexAlreadyExists(
                self.index_dir.display().to_string(),
            ));
        }

        let staging = IndexStore::new(sibling_dir(&self.index_dir, "staging"));
        if staging.index_dir.exists() {
            tracing::warn!(
                "Removing leftover staging index at {}",
                staging.index_dir.display()
            );
            fs::remove_dir_all(&staging.index_dir)?;
        }

        fs::create_dir_all(&staging.index_dir)?;
        let index = Arc::new(TantivyIndex::create(&staging.tantivy_dir())?);
        staging.save_meta(meta)?;

        tracing::debug!("Staging new index at {}", staging.index_dir.display());
        Ok(IndexBuild {
            staging,
            target: self.index_dir.clone(),
            index,
        })
    }

    /// Open the index, refusing older schema versions
    pub fn open(&self) -> Result<TantivyIndex> {
        let meta = self.load_meta()?;
        if meta.schema_version < SCHEMA_VERSION {
            return Err(IndexerError::StorageError(format!(
                "Index at {} uses schema version {} (current: v{}). \
                 Please re-index with --force.",
                self.index_dir.display(),
                meta.schema_version,
                SCHEMA_VERSION
            )));
        }

        TantivyIndex::open(&self.tantivy_dir())
    }

    pub fn load_meta(&self) -> Result<IndexMeta> {
        let meta_path = self.meta_path();
        if !meta_path.exists() {
            return Err(IndexerError::IndexNotFound(
                self.index_dir.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&meta_path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_meta(&self, meta: &IndexMeta) -> Result<()> {
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(self.meta_path(), json)?;
        Ok(())
    }

    /// Record a finished run in `meta.json`
    pub fn record_run(&self, snapshot: StatusSnapshot) -> Result<IndexMeta> {
        let mut meta = self.load_meta()?;
        meta.last_indexed_at = snapshot.finished_at.or_else(|| Some(Utc::now()));
        meta.last_status = Some(snapshot);
        meta.index_size_bytes = self.size_bytes();
        self.save_meta(&meta)?;
        Ok(meta)
    }

    /// Total size of the files under the index directory
    pub fn size_bytes(&self) -> u64 {
        WalkDir::new(&self.index_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }
}

/// An index under construction in a staging directory
pub struct IndexBuild {
    staging: IndexStore,
    target: PathBuf,
    index: Arc<TantivyIndex>,
}

impl IndexBuild {
    pub fn index(&self) -> &Arc<TantivyIndex> {
        &self.index
    }

    /// Backend handle for a full index run
    pub fn backend(&self) -> Arc<dyn IndexBackend> {
        self.index.clone()
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.index_dir()
    }

    /// Swap the staged index in place of the live one
    pub fn publish(self) -> Result<()> {
        let IndexBuild {
            staging,
            target,
            index,
        } = self;
        drop(index);

        let retired = sibling_dir(&target, "retired");
        if retired.exists() {
            fs::remove_dir_all(&retired)?;
        }

        let replacing = target.exists();
        if replacing {
            fs::rename(&target, &retired)?;
        }
        fs::rename(staging.index_dir(), &target)?;
        if replacing {
            fs::remove_dir_all(&retired)?;
        }

        tracing::info!("Published index at {}", target.display());
        Ok(())
    }

    /// Throw the staged index away, leaving the live one as it was
    pub fn discard(self) {
        let IndexBuild { staging, index, .. } = self;
        drop(index);

        if let Err(e) = fs::remove_dir_all(staging.index_dir()) {
            tracing::warn!(
                "Could not remove staging index at {}: {}",
                staging.index_dir().display(),
                e
            );
        }
    }
}

/// `<dir>.<suffix>` next to `dir`
fn sibling_dir(dir: &Path, suffix: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    dir.with_file_name(format!("{name}.{suffix}"))
}
