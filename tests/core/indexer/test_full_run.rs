// Full index runs through the service container

use crate::common::fixtures::write_portfolio_file;
use crate::common::{create_test_services, document_keys, portfolio_maps, run_full_index};
use crate::common::{HelpTree, TestCourse};
use olat_search::core::context::SearchResourceContext;
use olat_search::core::indexer::{
    DocumentSink, FullIndexer, Indexer, IndexerRegistry, IndexerState,
};
use olat_search::core::storage::{IndexSources, MemoryIndex};
use olat_search::core::types::{IndexDocument, Roles};
use olat_search::core::context::{BusinessControl, ContextEntry};
use olat_search::core::types::Identity;
use olat_search::{IndexerError, Result};
use std::sync::Arc;
use tempfile::TempDir;

struct AllSources {
    course: TestCourse,
    help: HelpTree,
    maps_dir: TempDir,
}

impl AllSources {
    fn new() -> Self {
        Self {
            course: TestCourse::small(),
            help: HelpTree::standard(),
            maps_dir: TempDir::new().unwrap(),
        }
    }

    fn sources(&self) -> IndexSources {
        IndexSources {
            root: Some(self.course.path().to_path_buf()),
            help_dir: Some(self.help.path().to_path_buf()),
            portfolio_file: Some(write_portfolio_file(
                self.maps_dir.path(),
                &portfolio_maps(),
            )),
            exclude_patterns: vec![],
        }
    }
}

#[test]
fn test_counters_after_full_run() {
    let fixture = AllSources::new();
    let services = create_test_services(true, 2);

    let (snapshot, backend) = run_full_index(&services, &fixture.sources()).unwrap();

    assert_eq!(snapshot.state, IndexerState::Finished);
    // 6 folder files, 2 pages x 2 locales, 4 maps
    assert_eq!(snapshot.document_count, 14);
    assert_eq!(backend.len(), 14);
    assert_eq!(backend.commit_count(), 1);
    assert_eq!(snapshot.part_document_counts, vec![6, 4, 2, 1, 1, 0, 0, 0]);
    assert_eq!(
        snapshot.part_document_counts.iter().sum::<u64>(),
        snapshot.document_count
    );

    assert_eq!(snapshot.document_counters["type.folder"], 6);
    assert_eq!(snapshot.document_counters["type.contexthelp"], 4);
    assert_eq!(snapshot.document_counters["type.db.EPDefaultMap"], 2);
    assert_eq!(snapshot.document_counters["type.db.EPStructuredMap"], 1);
    assert_eq!(snapshot.document_counters["type.db.EPStructuredMapTemplate"], 1);

    assert_eq!(snapshot.file_type_counters["type.file.text"], 5);
    assert_eq!(snapshot.file_type_counters["type.file.html"], 1);

    // logo.png has no parser
    assert_eq!(snapshot.excluded_document_count, 1);
    assert_eq!(snapshot.index_queue_size, 0);
    assert!(snapshot.finished_at >= snapshot.started_at);
}

#[test]
fn test_single_and_multi_threaded_produce_same_documents() {
    let fixture = AllSources::new();
    let sources = fixture.sources();

    let (single, single_docs) =
        run_full_index(&create_test_services(false, 1), &sources).unwrap();
    let (multi, multi_docs) = run_full_index(&create_test_services(true, 3), &sources).unwrap();

    assert_eq!(single.document_count, multi.document_count);
    assert_eq!(single.document_counters, multi.document_counters);
    assert_eq!(
        document_keys(&single_docs.documents()),
        document_keys(&multi_docs.documents())
    );
}

#[test]
fn test_hidden_and_excluded_items_are_skipped() {
    let course = TestCourse::small();
    let services = create_test_services(false, 1);

    let (_, backend) = run_full_index(
        &services,
        &IndexSources {
            root: Some(course.path().to_path_buf()),
            exclude_patterns: vec!["exercises".to_string()],
            ..IndexSources::default()
        },
    )
    .unwrap();

    let paths: Vec<String> = backend
        .documents()
        .iter()
        .filter_map(|d| d.file_path.clone())
        .collect();
    assert_eq!(paths.len(), 3);
    assert!(paths.contains(&"/syllabus.txt".to_string()));
    assert!(paths.contains(&"/notes/lifetimes.md".to_string()));
    assert!(paths.contains(&"/notes/traits.html".to_string()));
}

#[test]
fn test_folder_documents_carry_context() {
    let course = TestCourse::small();
    let services = create_test_services(true, 2);

    let (_, backend) = run_full_index(
        &services,
        &IndexSources {
            root: Some(course.path().to_path_buf()),
            ..IndexSources::default()
        },
    )
    .unwrap();

    let docs = backend.documents();
    let traits = docs
        .iter()
        .find(|d| d.file_path.as_deref() == Some("/notes/traits.html"))
        .unwrap();
    assert_eq!(traits.title, "Traits");
    assert_eq!(traits.content, "Traits Trait objects & generics");
    assert_eq!(traits.resource_url, "[Folder:0]");
    assert_eq!(traits.document_type, "type.folder");
    assert_eq!(traits.file_type.as_deref(), Some("type.file.html"));
    assert!(traits.last_modified.is_some());
}

#[test]
fn test_help_pages_rendered_per_locale() {
    let help = HelpTree::standard();
    let services = create_test_services(false, 1);

    let (snapshot, backend) = run_full_index(
        &services,
        &IndexSources {
            help_dir: Some(help.path().to_path_buf()),
            ..IndexSources::default()
        },
    )
    .unwrap();
    assert_eq!(snapshot.document_count, 4);

    let docs = backend.documents();
    let german = docs
        .iter()
        .find(|d| {
            d.file_path.as_deref() == Some("org.olat.course/course-editor")
                && d.locale.as_deref() == Some("de")
        })
        .unwrap();
    assert_eq!(german.title, "Kurseditor");
    assert_eq!(german.content, "Kurseditor Kursstruktur aufbauen");
    assert_eq!(german.resource_url, "[ContextHelp:0]");

    // No German strings for the maps page: keys stand in for text
    let untranslated = docs
        .iter()
        .find(|d| {
            d.file_path.as_deref() == Some("org.olat.portfolio/maps")
                && d.locale.as_deref() == Some("de")
        })
        .unwrap();
    assert_eq!(untranslated.title, "maps");
    assert_eq!(untranslated.content, "chelp.maps.body");
}

#[test]
fn test_registry_access_after_full_run() {
    let fixture = AllSources::new();
    let services = create_test_services(false, 1);
    let registry = services.build_registry(&fixture.sources()).unwrap();
    let guest = (Identity::anonymous(), Roles::anonymous());
    let owner = (Identity::new(10, "owner"), Roles::user());

    let help = BusinessControl::parse("[ContextHelp:0]");
    assert!(registry.check_access("type.contexthelp", &help, &guest.0, &guest.1));

    let folder = BusinessControl::parse("[Folder:0]");
    assert!(!registry.check_access("type.folder", &folder, &guest.0, &guest.1));
    assert!(registry.check_access("type.folder", &folder, &owner.0, &owner.1));

    let reflections = BusinessControl::parse("[EPDefaultMap:1]");
    assert!(registry.check_access("type.db.EPDefaultMap", &reflections, &owner.0, &owner.1));
    assert!(!registry.check_access(
        "type.db.EPDefaultMap",
        &reflections,
        &Identity::new(99, "stranger"),
        &Roles::user()
    ));

    assert!(!registry.check_access("type.unknown", &folder, &owner.0, &owner.1));
}

/// Stops the run from inside, then keeps adding documents
struct StopMidway {
    full_indexer: FullIndexer,
}

impl Indexer for StopMidway {
    fn supported_type_name(&self) -> &str {
        "type.stopper"
    }

    fn check_access(
        &self,
        _entry: &ContextEntry,
        _control: &BusinessControl,
        _identity: &Identity,
        _roles: &Roles,
    ) -> bool {
        true
    }

    fn do_index(&self, _parent: &SearchResourceContext, sink: &Arc<dyn DocumentSink>) -> Result<()> {
        sink.add_document(IndexDocument {
            title: "before stop".to_string(),
            document_type: "type.stopper".to_string(),
            ..IndexDocument::default()
        })?;
        self.full_indexer.stop();
        sink.add_document(IndexDocument {
            title: "after stop".to_string(),
            document_type: "type.stopper".to_string(),
            ..IndexDocument::default()
        })
    }
}

#[test]
fn test_stop_interrupts_run_without_commit() {
    let help = HelpTree::standard();
    let services = create_test_services(true, 2);
    let backend = Arc::new(MemoryIndex::default());
    let full_indexer = services.full_indexer(backend.clone());

    let mut registry = IndexerRegistry::new();
    registry
        .register(Arc::new(StopMidway {
            full_indexer: full_indexer.clone(),
        }))
        .unwrap();
    let help_registry = services
        .build_registry(&IndexSources {
            help_dir: Some(help.path().to_path_buf()),
            ..IndexSources::default()
        })
        .unwrap();
    for indexer in help_registry.indexers() {
        registry.register(indexer.clone()).unwrap();
    }

    let result = full_indexer.run(&registry);

    assert!(matches!(result, Err(IndexerError::Interrupted(_))));
    assert_eq!(backend.commit_count(), 0);
    assert_eq!(backend.len(), 1);
    assert_eq!(services.status.state(), IndexerState::Finished);
    // help indexer never ran
    assert_eq!(services.status.part_document_counts().unwrap(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_status_unavailable_before_first_run() {
    let services = create_test_services(false, 1);
    assert!(matches!(
        services.status.document_count(),
        Err(IndexerError::StatusNotStarted)
    ));
    assert!(services.status.snapshot().is_err());
    assert_eq!(services.status.state(), IndexerState::Stopped);
}

#[test]
fn test_second_run_resets_counters() {
    let course = TestCourse::small();
    let services = create_test_services(true, 2);
    let sources = IndexSources {
        root: Some(course.path().to_path_buf()),
        ..IndexSources::default()
    };

    let (first, _) = run_full_index(&services, &sources).unwrap();
    let (second, _) = run_full_index(&services, &sources).unwrap();

    assert_eq!(first.document_count, 6);
    assert_eq!(second.document_count, 6);
    assert_eq!(second.excluded_document_count, 1);
    assert_eq!(second.part_document_counts[0], 6);
}
