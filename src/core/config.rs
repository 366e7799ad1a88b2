//! Configuration management for the indexing core.
//!
//! Configuration is loaded from a TOML file and environment
//! variables, with defaults for every setting. The worker pool size,
//! the multi-threaded switch and the paging batch size are external
//! inputs and are never hard-coded in the indexers.

use crate::core::error::{IndexerError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub help: HelpConfig,
}

/// Indexing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Index folder subtrees on pooled worker threads
    #[serde(default = "default_multi_threaded")]
    pub multi_threaded: bool,

    /// Maximum number of concurrently running folder workers
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// How long `get_indexer` waits for a free worker before failing
    #[serde(default = "default_worker_acquire_timeout_ms")]
    pub worker_acquire_timeout_ms: u64,

    /// Page size used by indexers that load their domain in batches
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of per-part document counters (one per registered indexer)
    #[serde(default = "default_partial_indexers")]
    pub partial_indexers: usize,

    /// Maximum file size in MB (larger files are excluded)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// File suffixes the file document factory can parse
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,

    /// Glob patterns on item names rejected by the default access rule
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the search index
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Default number of results to return
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Maximum results per query
    #[serde(default = "default_max_k")]
    pub max_k: usize,
}

/// Context help configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HelpConfig {
    /// Locales for which help pages are rendered and indexed
    #[serde(default = "default_enabled_locales")]
    pub enabled_locales: Vec<String>,
}

// Default value functions
fn default_multi_threaded() -> bool {
    true
}

fn default_worker_pool_size() -> usize {
    4
}

fn default_worker_acquire_timeout_ms() -> u64 {
    30_000
}

fn default_batch_size() -> usize {
    500
}

fn default_partial_indexers() -> usize {
    8
}

fn default_max_file_size() -> usize {
    10
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_k() -> usize {
    10
}

fn default_max_k() -> usize {
    100
}

fn default_enabled_locales() -> Vec<String> {
    vec!["de".to_string(), "en".to_string()]
}

fn default_supported_extensions() -> Vec<String> {
    [
        "txt",
        "text",
        "md",
        "html",
        "htm",
        "xhtml",
        "xml",
        "csv",
        "json",
        "properties",
        "tex",
        "java",
        "rs",
        "py",
        "js",
        "css",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "CVS".to_string(),
        "__MACOSX".to_string(),
        "*.tmp".to_string(),
        "*~".to_string(),
    ]
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            multi_threaded: default_multi_threaded(),
            worker_pool_size: default_worker_pool_size(),
            worker_acquire_timeout_ms: default_worker_acquire_timeout_ms(),
            batch_size: default_batch_size(),
            partial_indexers: default_partial_indexers(),
            max_file_size_mb: default_max_file_size(),
            supported_extensions: default_supported_extensions(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
        }
    }
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            enabled_locales: default_enabled_locales(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| IndexerError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. OLAT_SEARCH_CONFIG env var
    /// 2. XDG config file (~/.config/olat-search/config.toml)
    /// 3. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("OLAT_SEARCH_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else {
                Self::default()
            }
        };

        // Default index location lives in the XDG data directory
        if env::var("OLAT_SEARCH_DATA_DIR").is_err()
            && config.storage.index_dir == default_index_dir()
        {
            config.storage.index_dir = xdg.index_dir();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(value) = env::var("OLAT_SEARCH_MULTI_THREADED") {
            if let Ok(enabled) = value.parse() {
                self.indexing.multi_threaded = enabled;
            }
        }
        if let Ok(value) = env::var("OLAT_SEARCH_WORKER_POOL_SIZE") {
            if let Ok(size) = value.parse() {
                self.indexing.worker_pool_size = size;
            }
        }
        if let Ok(value) = env::var("OLAT_SEARCH_WORKER_TIMEOUT_MS") {
            if let Ok(ms) = value.parse() {
                self.indexing.worker_acquire_timeout_ms = ms;
            }
        }
        if let Ok(value) = env::var("OLAT_SEARCH_BATCH_SIZE") {
            if let Ok(size) = value.parse() {
                self.indexing.batch_size = size;
            }
        }
        if let Ok(value) = env::var("OLAT_SEARCH_MAX_FILE_SIZE_MB") {
            if let Ok(size) = value.parse() {
                self.indexing.max_file_size_mb = size;
            }
        }

        if let Ok(data_dir) = env::var("OLAT_SEARCH_DATA_DIR") {
            self.storage.index_dir = PathBuf::from(data_dir).join("index");
        }

        if let Ok(value) = env::var("OLAT_SEARCH_DEFAULT_K") {
            if let Ok(k) = value.parse() {
                self.search.default_k = k;
            }
        }
        if let Ok(value) = env::var("OLAT_SEARCH_MAX_K") {
            if let Ok(k) = value.parse() {
                self.search.max_k = k;
            }
        }

        if let Ok(value) = env::var("OLAT_SEARCH_LOCALES") {
            let locales: Vec<String> = value
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            if !locales.is_empty() {
                self.help.enabled_locales = locales;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.indexing.worker_pool_size == 0 {
            return Err(IndexerError::ConfigError(
                "Worker pool size must be non-zero".to_string(),
            ));
        }

        if self.indexing.worker_acquire_timeout_ms == 0 {
            return Err(IndexerError::ConfigError(
                "Worker acquire timeout must be non-zero".to_string(),
            ));
        }

        if self.indexing.batch_size == 0 {
            return Err(IndexerError::ConfigError(
                "Batch size must be non-zero".to_string(),
            ));
        }

        if self.indexing.partial_indexers == 0 {
            return Err(IndexerError::ConfigError(
                "Partial indexer count must be non-zero".to_string(),
            ));
        }

        if self.search.default_k == 0 {
            return Err(IndexerError::ConfigError(
                "Default k must be non-zero".to_string(),
            ));
        }

        if self.search.default_k > self.search.max_k {
            return Err(IndexerError::ConfigError(
                "Default k cannot exceed max k".to_string(),
            ));
        }

        if self.help.enabled_locales.is_empty() {
            return Err(IndexerError::ConfigError(
                "At least one help locale must be enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Multi-threaded: {}", self.indexing.multi_threaded);
        tracing::info!("  Worker pool size: {}", self.indexing.worker_pool_size);
        tracing::info!(
            "  Worker acquire timeout: {}ms",
            self.indexing.worker_acquire_timeout_ms
        );
        tracing::info!("  Batch size: {}", self.indexing.batch_size);
        tracing::info!("  Max file size: {} MB", self.indexing.max_file_size_mb);
        tracing::info!(
            "  Supported extensions: {}",
            self.indexing.supported_extensions.len()
        );
        tracing::info!("  Index dir: {:?}", self.storage.index_dir);
        tracing::info!("  Default k: {}", self.search.default_k);
        tracing::info!("  Max k: {}", self.search.max_k);
        tracing::info!("  Help locales: {:?}", self.help.enabled_locales);
    }
}
