//! BM25 search implementation using Tantivy.
//!
//! Hits are routed back to the indexer that produced them: a hit whose
//! document type has no registered indexer, or whose indexer denies the
//! searching identity, is dropped from the response.

use crate::core::context::BusinessControl;
use crate::core::error::{IndexerError, Result};
use crate::core::indexer::producer::IndexerRegistry;
use crate::core::search::query::{preprocess_query, validate_query_fields};
use crate::core::storage::{IndexFields, TantivyIndex};
use crate::core::types::{Identity, Roles, SearchHit, SearchResponse};
use std::sync::Arc;
use std::time::Instant;
use tantivy::{
    collector::TopDocs,
    query::QueryParser,
    schema::{Field, Value},
    TantivyDocument,
};

/// BM25 search service with query-time access checks
pub struct SearchService {
    index: Arc<TantivyIndex>,
    registry: Arc<IndexerRegistry>,
    default_k: usize,
    max_k: usize,
}

impl SearchService {
    pub fn new(
        index: Arc<TantivyIndex>,
        registry: Arc<IndexerRegistry>,
        default_k: usize,
        max_k: usize,
    ) -> Self {
        Self {
            index,
            registry,
            default_k,
            max_k,
        }
    }

    /// Number of committed documents
    pub fn num_docs(&self) -> Result<u64> {
        Ok(self.index.reader()?.searcher().num_docs())
    }

    /// Search title, description and content; return at most `limit`
    /// hits the identity may see
    pub fn search(
        &self,
        query_str: &str,
        identity: &Identity,
        roles: &Roles,
        limit: Option<usize>,
    ) -> Result<SearchResponse> {
        let start = Instant::now();

        if query_str.trim().is_empty() {
            return Err(IndexerError::InvalidQuery(
                "Query cannot be empty".to_string(),
            ));
        }
        validate_query_fields(query_str)?;

        let k_limit = limit.unwrap_or(self.default_k).min(self.max_k).max(1);

        let reader = self
            .index
            .reader()
            .map_err(|e| IndexerError::SearchFailed(format!("Failed to create reader: {e}")))?;
        let searcher = reader.searcher();
        let fields = self.index.fields();

        let query_parser = QueryParser::for_index(
            self.index.index(),
            vec![fields.title, fields.description, fields.content],
        );
        let query = query_parser
            .parse_query(&preprocess_query(query_str, false))
            .map_err(|e| IndexerError::InvalidQuery(format!("Failed to parse query: {e}")))?;

        // Denied hits are replaced by fetching further candidates
        let batch = k_limit * 2;
        let mut offset = 0;
        let mut hits = Vec::with_capacity(k_limit);
        let mut filtered = 0;

        'pages: loop {
            let top_docs = searcher
                .search(&query, &TopDocs::with_limit(batch).and_offset(offset))
                .map_err(|e| IndexerError::SearchFailed(format!("Search failed: {e}")))?;
            let fetched = top_docs.len();

            for (score, doc_address) in top_docs {
                let doc: TantivyDocument = searcher.doc(doc_address).map_err(|e| {
                    IndexerError::SearchFailed(format!("Failed to retrieve document: {e}"))
                })?;
                let hit = Self::to_hit(&doc, fields, score);

                let control = BusinessControl::parse(&hit.resource_url);
                if !self
                    .registry
                    .check_access(&hit.document_type, &control, identity, roles)
                {
                    filtered += 1;
                    continue;
                }

                hits.push(hit);
                if hits.len() == k_limit {
                    break 'pages;
                }
            }

            if fetched < batch {
                break;
            }
            offset += fetched;
        }

        if filtered > 0 {
            tracing::debug!(
                "Dropped {} hits not visible to identity {}",
                filtered,
                identity.key
            );
        }

        Ok(SearchResponse {
            query: query_str.to_string(),
            hits,
            filtered,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn to_hit(doc: &TantivyDocument, fields: &IndexFields, score: f32) -> SearchHit {
        SearchHit {
            score,
            title: Self::extract_text(doc, fields.title),
            description: Self::extract_text(doc, fields.description),
            resource_url: Self::extract_text(doc, fields.resource_url),
            document_type: Self::extract_text(doc, fields.document_type),
            file_path: Self::extract_optional(doc, fields.file_path),
            locale: Self::extract_optional(doc, fields.locale),
        }
    }

    /// Extract text field from document
    fn extract_text(doc: &TantivyDocument, field: Field) -> String {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }

    fn extract_optional(doc: &TantivyDocument, field: Field) -> Option<String> {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
