//! Portfolio map indexers.
//!
//! One indexer exists per [`MapKind`]. Each pages through every map of
//! the source and keeps the maps of its own kind.

use crate::core::context::{BusinessControl, ContextEntry, SearchResourceContext};
use crate::core::error::Result;
use crate::core::indexer::file_document::strip_markup;
use crate::core::indexer::full::DocumentSink;
use crate::core::indexer::producer::Indexer;
use crate::core::types::{Identity, IndexDocument, Roles};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Kind of portfolio map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    Default,
    Structured,
    Template,
}

impl MapKind {
    pub const ALL: [MapKind; 3] = [MapKind::Default, MapKind::Structured, MapKind::Template];

    /// Document type tag
    pub fn type_name(&self) -> &'static str {
        match self {
            MapKind::Default => "type.db.EPDefaultMap",
            MapKind::Structured => "type.db.EPStructuredMap",
            MapKind::Template => "type.db.EPStructuredMapTemplate",
        }
    }

    /// Business path resource type
    pub fn resource_type(&self) -> &'static str {
        match self {
            MapKind::Default => "EPDefaultMap",
            MapKind::Structured => "EPStructuredMap",
            MapKind::Template => "EPStructuredMapTemplate",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioPage {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMap {
    pub key: i64,
    pub kind: MapKind,
    pub title: String,
    pub description: String,
    /// Identity keys of the owners
    pub owners: Vec<i64>,
    /// Identity keys the map is shared with
    pub shared_with: Vec<i64>,
    pub public: bool,
    pub pages: Vec<PortfolioPage>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl PortfolioMap {
    pub fn new(key: i64, kind: MapKind, title: impl Into<String>) -> Self {
        Self {
            key,
            kind,
            title: title.into(),
            description: String::new(),
            owners: Vec::new(),
            shared_with: Vec::new(),
            public: false,
            pages: Vec::new(),
            last_modified: None,
        }
    }

    pub fn owned_by(mut self, identity_key: i64) -> Self {
        self.owners.push(identity_key);
        self
    }

    pub fn shared_with(mut self, identity_key: i64) -> Self {
        self.shared_with.push(identity_key);
        self
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_page(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.pages.push(PortfolioPage {
            title: title.into(),
            description: description.into(),
        });
        self
    }

    /// Searchable text: map description, then every page
    fn content(&self) -> String {
        let mut parts = vec![self.description.as_str()];
        for page in &self.pages {
            parts.push(&page.title);
            parts.push(&page.description);
        }
        strip_markup(&parts.join(" "))
    }
}

/// Paged access to stored portfolio maps
pub trait PortfolioMapSource: Send + Sync {
    /// Up to `max` maps of any kind starting at offset `first`, in a stable order
    fn load_maps(&self, first: usize, max: usize) -> Result<Vec<PortfolioMap>>;

    fn find_map(&self, key: i64) -> Result<Option<PortfolioMap>>;
}

/// Maps held in memory; counts page loads
#[derive(Debug, Default)]
pub struct MemoryPortfolioSource {
    maps: Vec<PortfolioMap>,
    loads: AtomicUsize,
}

impl MemoryPortfolioSource {
    pub fn new(maps: Vec<PortfolioMap>) -> Self {
        Self {
            maps,
            loads: AtomicUsize::new(0),
        }
    }

    /// Load maps from a JSON array of [`PortfolioMap`]
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let maps: Vec<PortfolioMap> = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded {} portfolio maps from {}", maps.len(), path.display());
        Ok(Self::new(maps))
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl PortfolioMapSource for MemoryPortfolioSource {
    fn load_maps(&self, first: usize, max: usize) -> Result<Vec<PortfolioMap>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.maps.iter().skip(first).take(max).cloned().collect())
    }

    fn find_map(&self, key: i64) -> Result<Option<PortfolioMap>> {
        Ok(self.maps.iter().find(|m| m.key == key).cloned())
    }
}

/// Indexes the portfolio maps of one kind
pub struct PortfolioMapIndexer {
    kind: MapKind,
    source: Arc<dyn PortfolioMapSource>,
    batch_size: usize,
}

impl PortfolioMapIndexer {
    pub fn new(kind: MapKind, source: Arc<dyn PortfolioMapSource>, batch_size: usize) -> Self {
        Self {
            kind,
            source,
            batch_size: batch_size.max(1),
        }
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    fn accept(&self, map: &PortfolioMap) -> bool {
        map.kind == self.kind
    }

    fn document(&self, parent: &SearchResourceContext, map: &PortfolioMap) -> IndexDocument {
        let mut context = parent
            .child()
            .with_business_entry(self.kind.resource_type(), map.key);
        context.set_document_type(self.kind.type_name());
        context.set_last_modified(map.last_modified);

        IndexDocument {
            title: map.title.clone(),
            description: strip_markup(&map.description),
            content: map.content(),
            resource_url: context.business_path().to_string(),
            document_type: context.document_type().to_string(),
            file_type: None,
            file_path: None,
            locale: None,
            last_modified: context.last_modified(),
        }
    }
}

impl Indexer for PortfolioMapIndexer {
    fn supported_type_name(&self) -> &str {
        self.kind.type_name()
    }

    fn check_access(
        &self,
        entry: &ContextEntry,
        _control: &BusinessControl,
        identity: &Identity,
        roles: &Roles,
    ) -> bool {
        if roles.guest {
            return false;
        }

        let map = match self.source.find_map(entry.resource_id) {
            Ok(Some(map)) if self.accept(&map) => map,
            Ok(_) => return false,
            Err(e) => {
                tracing::warn!("Cannot load portfolio map {}: {}", entry.resource_id, e);
                return false;
            }
        };

        if map.owners.contains(&identity.key) {
            return true;
        }

        match self.kind {
            MapKind::Template => roles.author || roles.administrator,
            MapKind::Default | MapKind::Structured => {
                map.public || map.shared_with.contains(&identity.key)
            }
        }
    }

    fn do_index(
        &self,
        parent: &SearchResourceContext,
        sink: &Arc<dyn DocumentSink>,
    ) -> Result<()> {
        let mut first = 0;
        let mut indexed = 0usize;

        loop {
            let maps = self.source.load_maps(first, self.batch_size)?;
            let loaded = maps.len();

            for map in maps.iter().filter(|m| self.accept(m)) {
                sink.add_document(self.document(parent, map))?;
                indexed += 1;
            }

            if loaded < self.batch_size {
                break;
            }
            first += loaded;
        }

        tracing::info!("Indexed {} portfolio maps of {:?} kind", indexed, self.kind);
        Ok(())
    }
}
