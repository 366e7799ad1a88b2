//! Tantivy integration for BM25 full-text search.
//!
//! This module wraps Tantivy operations for creating, filling
//! and reading the document index.

use crate::core::error::{IndexerError, Result};
use crate::core::storage::IndexBackend;
use crate::core::types::IndexDocument;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::Path;
use tantivy::schema::*;
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument};

/// Current schema version
/// Version 1: Initial document schema
/// Version 2: Added locale and last_modified
pub const SCHEMA_VERSION: u32 = 2;

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Create the Tantivy schema for document indexing
///
/// Fields:
/// - title, description, content: Full-text searchable (TEXT | STORED)
/// - resource_url: Business path used for access checks (STRING | STORED)
/// - document_type, file_type, file_path, locale: Metadata (STRING | STORED)
/// - last_modified: Source modification time (Date | STORED)
/// - indexed_at: Timestamp (Date | STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    // Searchable text
    builder.add_text_field("title", TEXT | STORED);
    builder.add_text_field("description", TEXT | STORED);
    builder.add_text_field("content", TEXT | STORED);

    // Metadata (stored for retrieval, exact match for filtering)
    builder.add_text_field("resource_url", STRING | STORED);
    builder.add_text_field("document_type", STRING | STORED);
    builder.add_text_field("file_type", STRING | STORED);
    builder.add_text_field("file_path", STRING | STORED);
    builder.add_text_field("locale", STRING | STORED);

    // Timestamps
    builder.add_date_field("last_modified", STORED);
    builder.add_date_field("indexed_at", STORED);

    builder.build()
}

/// Resolved field handles of [`create_schema`]
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
    pub title: Field,
    pub description: Field,
    pub content: Field,
    pub resource_url: Field,
    pub document_type: Field,
    pub file_type: Field,
    pub file_path: Field,
    pub locale: Field,
    pub last_modified: Field,
    pub indexed_at: Field,
}

impl IndexFields {
    pub fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| IndexerError::StorageError(format!("Missing {name} field: {e}")))
        };

        Ok(Self {
            title: field("title")?,
            description: field("description")?,
            content: field("content")?,
            resource_url: field("resource_url")?,
            document_type: field("document_type")?,
            file_type: field("file_type")?,
            file_path: field("file_path")?,
            locale: field("locale")?,
            last_modified: field("last_modified")?,
            indexed_at: field("indexed_at")?,
        })
    }
}

/// Tantivy index wrapper
pub struct TantivyIndex {
    /// Tantivy index instance
    index: Index,

    /// Schema definition
    schema: Schema,

    fields: IndexFields,

    /// Index writer, shared by concurrent appenders
    writer: Mutex<IndexWriter>,
}

impl std::fmt::Debug for TantivyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyIndex")
            .field("schema", &"<schema>")
            .finish()
    }
}

impl TantivyIndex {
    /// Create a new Tantivy index at the given path
    pub fn create(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let index = Index::create_in_dir(index_dir, create_schema())
            .map_err(|e| IndexerError::StorageError(format!("Failed to create index: {e}")))?;

        Self::from_index(index)
    }

    /// Create an index that lives only in memory
    pub fn create_in_ram() -> Result<Self> {
        Self::from_index(Index::create_in_ram(create_schema()))
    }

    /// Open an existing Tantivy index
    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .map_err(|e| IndexerError::StorageError(format!("Failed to open index: {e}")))?;

        Self::from_index(index)
    }

    fn from_index(index: Index) -> Result<Self> {
        let schema = index.schema();
        let fields = IndexFields::resolve(&schema)?;

        let writer = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| IndexerError::StorageError(format!("Failed to create writer: {e}")))?;

        Ok(Self {
            index,
            schema,
            fields,
            writer: Mutex::new(writer),
        })
    }

    /// Get an index reader for searching
    pub fn reader(&self) -> Result<IndexReader> {
        self.index
            .reader()
            .map_err(|e| IndexerError::StorageError(format!("Failed to create reader: {e}")))
    }

    /// Get the schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &IndexFields {
        &self.fields
    }

    /// Get a reference to the underlying Tantivy index
    pub fn index(&self) -> &Index {
        &self.index
    }

    fn to_tantivy_document(&self, document: &IndexDocument) -> TantivyDocument {
        let fields = &self.fields;
        let mut doc = TantivyDocument::default();

        doc.add_text(fields.title, &document.title);
        doc.add_text(fields.description, &document.description);
        doc.add_text(fields.content, &document.content);
        doc.add_text(fields.resource_url, &document.resource_url);
        doc.add_text(fields.document_type, &document.document_type);

        if let Some(file_type) = &document.file_type {
            doc.add_text(fields.file_type, file_type);
        }
        if let Some(file_path) = &document.file_path {
            doc.add_text(fields.file_path, file_path);
        }
        if let Some(locale) = &document.locale {
            doc.add_text(fields.locale, locale);
        }
        if let Some(modified) = document.last_modified {
            doc.add_date(fields.last_modified, to_tantivy_date(modified));
        }
        doc.add_date(fields.indexed_at, to_tantivy_date(Utc::now()));

        doc
    }
}

fn to_tantivy_date(when: DateTime<Utc>) -> tantivy::DateTime {
    tantivy::DateTime::from_timestamp_secs(when.timestamp())
}

impl IndexBackend for TantivyIndex {
    fn add(&self, document: IndexDocument) -> Result<()> {
        let doc = self.to_tantivy_document(&document);
        self.writer
            .lock()
            .add_document(doc)
            .map_err(|e| IndexerError::StorageError(format!("Failed to add document: {e}")))?;
        Ok(())
    }

    /// Commit changes to disk
    fn commit(&self) -> Result<()> {
        self.writer
            .lock()
            .commit()
            .map_err(|e| IndexerError::StorageError(format!("Failed to commit: {e}")))?;
        Ok(())
    }
}
