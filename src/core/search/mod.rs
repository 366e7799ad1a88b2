//! Search module for BM25 full-text search.
//!
//! Queries run over the title, description and content fields using
//! Tantivy's BM25 ranking. Results are filtered per identity by the
//! indexer registered for each hit's document type.

mod bm25;
mod query;

pub use bm25::SearchService;
pub use query::{preprocess_query, validate_query_fields, VALID_FIELDS};
