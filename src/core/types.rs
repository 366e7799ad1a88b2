//! Domain data structures shared by producers, storage and search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document type tag used when a leaf's context carries none
pub const FILE_DOCUMENT_TYPE: &str = "type.file";

/// A flat field/value record appended to the search index.
///
/// Documents are append-only; a full reindex replaces the whole index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Display title of the hit
    pub title: String,

    /// Short description shown under the title
    pub description: String,

    /// Full text content
    pub content: String,

    /// Business path used to navigate back to the resource
    pub resource_url: String,

    /// Type tag of the producing indexer (e.g. `type.contexthelp`)
    pub document_type: String,

    /// File type tag for documents built from files
    pub file_type: Option<String>,

    /// Virtual path of the file inside its container tree
    pub file_path: Option<String>,

    /// Locale of the rendered content
    pub locale: Option<String>,

    /// Last modification of the source object
    pub last_modified: Option<DateTime<Utc>>,
}

/// The user a query-time access check is evaluated for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub key: i64,
    pub name: String,
}

impl Identity {
    pub fn new(key: i64, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
        }
    }

    /// Identity used for unauthenticated searches
    pub fn anonymous() -> Self {
        Self::new(0, "anonymous")
    }
}

/// Roles of an identity at query time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub guest: bool,
    pub author: bool,
    pub administrator: bool,
}

impl Roles {
    /// Role set of an anonymous guest
    pub fn anonymous() -> Self {
        Self {
            guest: true,
            ..Self::default()
        }
    }

    /// Plain authenticated user
    pub fn user() -> Self {
        Self::default()
    }

    pub fn author() -> Self {
        Self {
            author: true,
            ..Self::default()
        }
    }

    pub fn administrator() -> Self {
        Self {
            author: true,
            administrator: true,
            ..Self::default()
        }
    }
}

/// A single search hit after access filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// BM25 relevance score (higher = more relevant)
    pub score: f32,
    pub title: String,
    pub description: String,
    pub resource_url: String,
    pub document_type: String,
    pub file_path: Option<String>,
    pub locale: Option<String>,
}

/// Search response with hits and timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
    /// Hits dropped by query-time access checks
    pub filtered: usize,
    pub duration_ms: u64,
}
