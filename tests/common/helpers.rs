// Test helper functions

use olat_search::core::config::Config;
use olat_search::core::indexer::status::StatusSnapshot;
use olat_search::core::services::Services;
use olat_search::core::storage::{IndexSources, MemoryIndex};
use olat_search::core::types::IndexDocument;
use olat_search::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Create test services with temporary storage
#[allow(dead_code)]
pub fn create_test_services(multi_threaded: bool, workers: usize) -> Services {
    let mut config = Config::default();
    config.indexing.multi_threaded = multi_threaded;
    config.indexing.worker_pool_size = workers;
    config.indexing.worker_acquire_timeout_ms = 10_000;
    config.help.enabled_locales = vec!["de".to_string(), "en".to_string()];

    // Use temporary directory for tests
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    config.storage.index_dir = temp_dir.path().join("index");
    // Keep temp dir alive for duration of test
    std::mem::forget(temp_dir);

    Services::new(config)
}

/// Run one full index into memory
#[allow(dead_code)]
pub fn run_full_index(
    services: &Services,
    sources: &IndexSources,
) -> Result<(StatusSnapshot, Arc<MemoryIndex>)> {
    let registry = services.build_registry(sources)?;
    let backend = Arc::new(MemoryIndex::default());
    let snapshot = services.full_indexer(backend.clone()).run(&registry)?;
    Ok((snapshot, backend))
}

/// Order-independent identity of the produced documents
#[allow(dead_code)]
pub fn document_keys(documents: &[IndexDocument]) -> BTreeSet<(String, String, String)> {
    documents
        .iter()
        .map(|d| {
            (
                d.document_type.clone(),
                d.resource_url.clone(),
                format!(
                    "{}|{}",
                    d.file_path.clone().unwrap_or_default(),
                    d.locale.clone().unwrap_or_default()
                ),
            )
        })
        .collect()
}
