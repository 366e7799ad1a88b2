//! Document producers and their registry.
//!
//! Every producer owns one document type. At index time the registry runs
//! producers in registration order; at query time it routes access checks
//! to the producer owning a hit's document type.

use crate::core::context::{BusinessControl, ContextEntry, SearchResourceContext};
use crate::core::error::{IndexerError, Result};
use crate::core::indexer::full::DocumentSink;
use crate::core::types::{Identity, Roles};
use std::collections::HashMap;
use std::sync::Arc;

/// A source of index documents for one document type
pub trait Indexer: Send + Sync {
    /// Type tag stamped on every document this indexer produces
    fn supported_type_name(&self) -> &str;

    /// Whether the identity may see a hit routed to this indexer.
    ///
    /// `entry` is the business path entry the hit was routed by; `control`
    /// is the hit's full business path.
    fn check_access(
        &self,
        entry: &ContextEntry,
        control: &BusinessControl,
        identity: &Identity,
        roles: &Roles,
    ) -> bool;

    /// Append this indexer's documents below `parent` to the sink
    fn do_index(&self, parent: &SearchResourceContext, sink: &Arc<dyn DocumentSink>)
        -> Result<()>;
}

/// Registered indexers, in registration order
#[derive(Default, Clone)]
pub struct IndexerRegistry {
    indexers: Vec<Arc<dyn Indexer>>,
    by_type: HashMap<String, usize>,
}

impl IndexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an indexer; type names must be unique
    pub fn register(&mut self, indexer: Arc<dyn Indexer>) -> Result<()> {
        let type_name = indexer.supported_type_name().to_string();
        if self.by_type.contains_key(&type_name) {
            return Err(IndexerError::ConfigError(format!(
                "Indexer for '{type_name}' is already registered"
            )));
        }

        tracing::debug!("Registered indexer '{}'", type_name);
        self.by_type.insert(type_name, self.indexers.len());
        self.indexers.push(indexer);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn Indexer>> {
        self.by_type.get(type_name).map(|&i| &self.indexers[i])
    }

    pub fn indexers(&self) -> &[Arc<dyn Indexer>] {
        &self.indexers
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.indexers.iter().map(|i| i.supported_type_name())
    }

    pub fn len(&self) -> usize {
        self.indexers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexers.is_empty()
    }

    /// Query-time access check for a hit.
    ///
    /// Unknown document types and hits without a business path are
    /// denied.
    pub fn check_access(
        &self,
        document_type: &str,
        control: &BusinessControl,
        identity: &Identity,
        roles: &Roles,
    ) -> bool {
        let Some(indexer) = self.get(document_type) else {
            tracing::debug!("No indexer registered for '{}'", document_type);
            return false;
        };
        let Some(entry) = control.last_entry() else {
            tracing::debug!("Hit of type '{}' has no business path", document_type);
            return false;
        };
        indexer.check_access(entry, control, identity, roles)
    }
}

impl std::fmt::Debug for IndexerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}
