// Index directory lifecycle: create, reindex, reopen

use crate::common::{create_test_services, TestCourse};
use olat_search::core::storage::{IndexMeta, IndexSources};
use olat_search::IndexerError;

fn sources(course: &TestCourse) -> IndexSources {
    IndexSources {
        root: Some(course.path().to_path_buf()),
        ..IndexSources::default()
    }
}

#[test]
fn test_reindex_with_force_replaces_documents() {
    let course = TestCourse::small();
    let services = create_test_services(true, 2);
    let store = services.index_store();
    let registry = services.build_registry(&sources(&course)).unwrap();

    for force in [false, true] {
        let build = store
            .create(&IndexMeta::new(sources(&course)), force)
            .unwrap();
        let snapshot = services
            .full_indexer(build.backend())
            .run(&registry)
            .unwrap();
        build.publish().unwrap();
        store.record_run(snapshot).unwrap();
    }

    let reader = store.open().unwrap().reader().unwrap();
    assert_eq!(reader.searcher().num_docs(), 6);
}

#[test]
fn test_create_without_force_keeps_existing_index() {
    let course = TestCourse::small();
    let services = create_test_services(false, 1);
    let store = services.index_store();

    store
        .create(&IndexMeta::new(sources(&course)), false)
        .unwrap()
        .publish()
        .unwrap();
    let second = store.create(&IndexMeta::new(IndexSources::default()), false);

    assert!(matches!(second, Err(IndexerError::IndexAlreadyExists(_))));
    assert_eq!(store.load_meta().unwrap().sources, sources(&course));
}

#[test]
fn test_meta_without_run_has_no_status() {
    let course = TestCourse::small();
    let services = create_test_services(false, 1);
    let store = services.index_store();

    store
        .create(&IndexMeta::new(sources(&course)), false)
        .unwrap()
        .publish()
        .unwrap();

    let meta = store.load_meta().unwrap();
    assert!(meta.last_status.is_none());
    assert!(meta.last_indexed_at.is_none());
}

#[test]
fn test_missing_index_reports_not_found() {
    let services = create_test_services(false, 1);
    let store = services.index_store();
    assert!(matches!(
        store.load_meta(),
        Err(IndexerError::IndexNotFound(_))
    ));
}

#[test]
fn test_interrupted_forced_reindex_keeps_published_index() {
    let course = TestCourse::small();
    let services = create_test_services(true, 2);
    let store = services.index_store();
    let registry = services.build_registry(&sources(&course)).unwrap();

    let build = store
        .create(&IndexMeta::new(sources(&course)), false)
        .unwrap();
    let snapshot = services
        .full_indexer(build.backend())
        .run(&registry)
        .unwrap();
    build.publish().unwrap();
    store.record_run(snapshot).unwrap();

    let build = store
        .create(&IndexMeta::new(sources(&course)), true)
        .unwrap();
    let full_indexer = services.full_indexer(build.backend());
    full_indexer.stop();
    assert!(matches!(
        full_indexer.run(&registry),
        Err(IndexerError::Interrupted(_))
    ));
    drop(full_indexer);
    build.discard();

    let reader = store.open().unwrap().reader().unwrap();
    assert_eq!(reader.searcher().num_docs(), 6);
    assert_eq!(store.load_meta().unwrap().last_status.unwrap().document_count, 6);
}
