//! Folder resources: a container tree published under one business path.

use crate::core::context::{BusinessControl, ContextEntry, SearchResourceContext};
use crate::core::error::Result;
use crate::core::indexer::access::AccessRule;
use crate::core::indexer::folder::FolderIndexer;
use crate::core::indexer::full::DocumentSink;
use crate::core::indexer::producer::Indexer;
use crate::core::types::{Identity, Roles};
use crate::core::vfs::VfsContainer;
use std::sync::Arc;

pub const FOLDER_DOCUMENT_TYPE: &str = "type.folder";
pub const FOLDER_RESOURCE: &str = "Folder";

/// Indexes every accepted file below a root container
pub struct FolderResourceIndexer {
    type_name: String,
    resource_type: String,
    resource_id: i64,
    title: String,
    root: Arc<dyn VfsContainer>,
    walker: FolderIndexer,
    rule: Arc<dyn AccessRule>,
}

impl FolderResourceIndexer {
    pub fn new(
        root: Arc<dyn VfsContainer>,
        walker: FolderIndexer,
        rule: Arc<dyn AccessRule>,
    ) -> Self {
        Self {
            type_name: FOLDER_DOCUMENT_TYPE.to_string(),
            resource_type: FOLDER_RESOURCE.to_string(),
            resource_id: 0,
            title: root.name().to_string(),
            root,
            walker,
            rule,
        }
    }

    /// Document type tag; must be unique within a registry
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_resource(mut self, resource_type: impl Into<String>, resource_id: i64) -> Self {
        self.resource_type = resource_type.into();
        self.resource_id = resource_id;
        self
    }

    /// Title shown as the description of every file document
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Indexer for FolderResourceIndexer {
    fn supported_type_name(&self) -> &str {
        &self.type_name
    }

    fn check_access(
        &self,
        _entry: &ContextEntry,
        _control: &BusinessControl,
        _identity: &Identity,
        roles: &Roles,
    ) -> bool {
        !roles.guest
    }

    fn do_index(
        &self,
        parent: &SearchResourceContext,
        sink: &Arc<dyn DocumentSink>,
    ) -> Result<()> {
        let mut context = parent
            .child()
            .with_business_entry(&self.resource_type, self.resource_id);
        context.set_document_type(self.type_name.as_str());
        context.set_parent_title(self.title.as_str());

        tracing::info!(
            "Indexing folder '{}' as {}",
            self.root.name(),
            context.business_path()
        );

        self.walker.index_vfs_container(
            &context,
            Arc::clone(&self.root),
            Arc::clone(sink),
            "",
            Arc::clone(&self.rule),
        )
    }
}
