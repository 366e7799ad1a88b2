// BM25 search over a committed full index with query-time access checks

use crate::common::fixtures::write_portfolio_file;
use crate::common::{create_test_services, portfolio_maps, HelpTree, TestCourse};
use olat_search::core::search::SearchService;
use olat_search::core::services::Services;
use olat_search::core::storage::{IndexMeta, IndexSources};
use olat_search::core::types::{Identity, Roles};
use std::sync::Arc;
use tempfile::TempDir;

struct Indexed {
    _course: TestCourse,
    _help: HelpTree,
    _maps: TempDir,
    services: Services,
    search: SearchService,
}

fn index_everything() -> Indexed {
    let course = TestCourse::small();
    let help = HelpTree::standard();
    let maps = TempDir::new().unwrap();
    let services = create_test_services(true, 2);

    let sources = IndexSources {
        root: Some(course.path().to_path_buf()),
        help_dir: Some(help.path().to_path_buf()),
        portfolio_file: Some(write_portfolio_file(maps.path(), &portfolio_maps())),
        exclude_patterns: vec![],
    };

    let store = services.index_store();
    let build = store.create(&IndexMeta::new(sources.clone()), false).unwrap();
    let registry = services.build_registry(&sources).unwrap();
    let snapshot = services
        .full_indexer(build.backend())
        .run(&registry)
        .unwrap();
    build.publish().unwrap();
    store.record_run(snapshot).unwrap();

    let search = SearchService::new(
        Arc::new(store.open().unwrap()),
        Arc::new(registry),
        10,
        100,
    );

    Indexed {
        _course: course,
        _help: help,
        _maps: maps,
        services,
        search,
    }
}

#[test]
fn test_committed_documents_are_searchable() {
    let indexed = index_everything();
    assert_eq!(indexed.search.num_docs().unwrap(), 14);

    let response = indexed
        .search
        .search("borrowing", &Identity::new(10, "owner"), &Roles::user(), None)
        .unwrap();

    let urls: Vec<&str> = response.hits.iter().map(|h| h.resource_url.as_str()).collect();
    assert!(urls.contains(&"[Folder:0]"));
    assert!(response.hits.iter().all(|h| h.score > 0.0));
}

#[test]
fn test_guest_sees_help_but_not_folders() {
    let indexed = index_everything();

    let response = indexed
        .search
        .search("course", &Identity::anonymous(), &Roles::anonymous(), None)
        .unwrap();

    assert!(!response.hits.is_empty());
    assert!(response
        .hits
        .iter()
        .all(|h| h.document_type == "type.contexthelp"));
    // portfolio maps mention courses too
    assert!(response.filtered > 0);
}

#[test]
fn test_portfolio_visibility_follows_sharing() {
    let indexed = index_everything();
    let query = "\"borrowing practice\"";

    let shared = indexed
        .search
        .search(query, &Identity::new(12, "friend"), &Roles::user(), None)
        .unwrap();
    assert_eq!(shared.hits.len(), 1);
    assert_eq!(shared.hits[0].resource_url, "[EPDefaultMap:2]");

    let stranger = indexed
        .search
        .search(query, &Identity::new(99, "stranger"), &Roles::user(), None)
        .unwrap();
    assert!(stranger.hits.is_empty());
    assert_eq!(stranger.filtered, 1);
}

#[test]
fn test_templates_visible_to_authors() {
    let indexed = index_everything();

    let author = indexed
        .search
        .search("template", &Identity::new(30, "author"), &Roles::author(), None)
        .unwrap();
    assert!(author
        .hits
        .iter()
        .any(|h| h.document_type == "type.db.EPStructuredMapTemplate"));

    let user = indexed
        .search
        .search("template", &Identity::new(30, "user"), &Roles::user(), None)
        .unwrap();
    assert!(user
        .hits
        .iter()
        .all(|h| h.document_type != "type.db.EPStructuredMapTemplate"));
}

#[test]
fn test_meta_records_last_run() {
    let indexed = index_everything();
    let meta = indexed.services.index_store().load_meta().unwrap();

    let status = meta.last_status.unwrap();
    assert_eq!(status.document_count, 14);
    assert!(meta.last_indexed_at.is_some());
    assert!(meta.index_size_bytes > 0);
}
