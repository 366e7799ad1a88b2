// Worker pool behaviour under real folder resources

use crate::common::{create_test_services, TestCourse};
use olat_search::core::indexer::{FolderResourceIndexer, IndexerRegistry};
use olat_search::core::services::Services;
use olat_search::core::storage::{IndexSources, MemoryIndex};
use olat_search::core::vfs::LocalContainer;
use std::sync::Arc;

/// One folder resource per top-level folder of the course
fn registry_per_folder(services: &Services, course: &TestCourse, folders: usize) -> IndexerRegistry {
    let mut registry = IndexerRegistry::new();
    for folder in 0..folders {
        let container = LocalContainer::open(course.path().join(format!("folder{folder}"))).unwrap();
        let indexer = FolderResourceIndexer::new(
            Arc::new(container),
            services.folder_indexer(),
            services.folder_rule(&[]).unwrap(),
        )
        .with_type_name(format!("type.folder.{folder}"))
        .with_resource("Folder", folder as i64);
        registry.register(Arc::new(indexer)).unwrap();
    }
    registry
}

#[test]
fn test_three_containers_on_two_workers() {
    let course = TestCourse::wide(3, 5);
    let services = create_test_services(true, 2);
    let registry = registry_per_folder(&services, &course, 3);
    let backend = Arc::new(MemoryIndex::default());

    let snapshot = services.full_indexer(backend.clone()).run(&registry).unwrap();

    assert_eq!(snapshot.document_count, 15);
    assert_eq!(&snapshot.part_document_counts[..3], &[5, 5, 5]);
    assert_eq!(services.pool.number_of_running_indexer(), 0);
    assert_eq!(services.pool.number_of_available_indexer(), 2);

    let mut urls: Vec<String> = backend
        .documents()
        .iter()
        .map(|d| d.resource_url.clone())
        .collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls, vec!["[Folder:0]", "[Folder:1]", "[Folder:2]"]);
}

#[test]
fn test_single_threaded_runs_on_caller() {
    let course = TestCourse::wide(3, 2);
    let services = create_test_services(false, 2);
    let registry = registry_per_folder(&services, &course, 3);
    let backend = Arc::new(MemoryIndex::default());

    let snapshot = services.full_indexer(backend.clone()).run(&registry).unwrap();

    assert!(services.pool.is_disabled());
    assert_eq!(snapshot.document_count, 6);
    // Caller-thread walks keep registration order
    let types: Vec<String> = backend
        .documents()
        .iter()
        .map(|d| d.document_type.clone())
        .collect();
    let mut sorted = types.clone();
    sorted.sort();
    assert_eq!(types, sorted);
}

#[test]
fn test_pool_sized_workers_run_concurrently() {
    let course = TestCourse::wide(4, 20);
    let services = create_test_services(true, 4);
    let registry = registry_per_folder(&services, &course, 4);
    let backend = Arc::new(MemoryIndex::default());

    let snapshot = services.full_indexer(backend).run(&registry).unwrap();

    assert_eq!(snapshot.document_count, 80);
    assert_eq!(snapshot.document_counters.len(), 4);
    assert!(snapshot.document_counters.values().all(|&count| count == 20));
}

#[test]
fn test_subfolders_of_one_resource_fan_out() {
    let course = TestCourse::wide(4, 20);
    let services = create_test_services(true, 4);
    let registry = services
        .build_registry(&IndexSources {
            root: Some(course.path().to_path_buf()),
            ..IndexSources::default()
        })
        .unwrap();
    let backend = Arc::new(MemoryIndex::default());

    let snapshot = services.full_indexer(backend.clone()).run(&registry).unwrap();

    assert_eq!(snapshot.document_count, 80);
    assert_eq!(services.pool.number_of_running_indexer(), 0);
    for folder in 0..4 {
        let prefix = format!("/folder{folder}/");
        let in_folder = backend
            .documents()
            .iter()
            .filter(|d| d.file_path.as_deref().is_some_and(|p| p.starts_with(&prefix)))
            .count();
        assert_eq!(in_folder, 20);
    }
}
