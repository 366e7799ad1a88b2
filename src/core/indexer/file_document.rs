//! Turns file leaves into index documents.
//!
//! Support is decided by file suffix and size. Leaves the factory
//! refuses are counted as excluded; the status reports that count.

use crate::core::config::IndexingConfig;
use crate::core::context::SearchResourceContext;
use crate::core::error::{IndexerError, Result};
use crate::core::types::{IndexDocument, FILE_DOCUMENT_TYPE};
use crate::core::vfs::VfsLeaf;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

pub const TEXT_FILE_TYPE: &str = "type.file.text";
pub const HTML_FILE_TYPE: &str = "type.file.html";
pub const XML_FILE_TYPE: &str = "type.file.xml";

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static SCRIPT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());
static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Builds documents from supported file leaves
#[derive(Debug)]
pub struct FileDocumentFactory {
    supported_extensions: HashSet<String>,
    max_file_size_bytes: u64,
    excluded: AtomicU64,
}

impl FileDocumentFactory {
    pub fn new(config: &IndexingConfig) -> Self {
        Self {
            supported_extensions: config
                .supported_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_file_size_bytes: (config.max_file_size_mb as u64) * 1024 * 1024,
            excluded: AtomicU64::new(0),
        }
    }

    /// Whether the leaf's type can be parsed; refused leaves are counted
    pub fn is_file_supported(&self, leaf: &dyn VfsLeaf) -> bool {
        let supported = match leaf.extension() {
            Some(ext) => self.supported_extensions.contains(&ext),
            None => false,
        };

        if !supported {
            self.excluded.fetch_add(1, Ordering::SeqCst);
            return false;
        }

        let size = leaf.size();
        if size > self.max_file_size_bytes {
            tracing::debug!(
                "Excluding large file: {} ({} bytes)",
                leaf.name(),
                size
            );
            self.excluded.fetch_add(1, Ordering::SeqCst);
            return false;
        }

        true
    }

    /// Parse a leaf into a document carrying the context's identity
    pub fn create_document(
        &self,
        context: &SearchResourceContext,
        leaf: &dyn VfsLeaf,
    ) -> Result<IndexDocument> {
        let extension = leaf.extension().ok_or_else(|| {
            IndexerError::UnsupportedDocument(format!("no file suffix: {}", leaf.name()))
        })?;

        let bytes = leaf.read_bytes()?;
        let raw = String::from_utf8(bytes).map_err(|_| {
            IndexerError::DocumentFailed(format!("not valid UTF-8: {}", leaf.name()))
        })?;

        let file_type = file_type_for(&extension);
        let (title, content) = match file_type {
            HTML_FILE_TYPE | XML_FILE_TYPE => {
                let title = TITLE_PATTERN
                    .captures(&raw)
                    .map(|caps| normalize_whitespace(&caps[1]))
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| leaf.name().to_string());
                (title, strip_markup(&raw))
            }
            _ => (leaf.name().to_string(), raw),
        };

        let document_type = if context.document_type().is_empty() {
            FILE_DOCUMENT_TYPE.to_string()
        } else {
            context.document_type().to_string()
        };

        Ok(IndexDocument {
            title,
            description: context.parent_title().unwrap_or_default().to_string(),
            content,
            resource_url: context.business_path().to_string(),
            document_type,
            file_type: Some(file_type.to_string()),
            file_path: context.file_path().map(str::to_string),
            locale: context.locale().map(str::to_string),
            last_modified: leaf.last_modified().or(context.last_modified()),
        })
    }

    pub fn excluded_count(&self) -> u64 {
        self.excluded.load(Ordering::SeqCst)
    }

    pub fn reset_excluded_count(&self) {
        self.excluded.store(0, Ordering::SeqCst);
    }
}

fn file_type_for(extension: &str) -> &'static str {
    match extension {
        "html" | "htm" | "xhtml" => HTML_FILE_TYPE,
        "xml" => XML_FILE_TYPE,
        _ => TEXT_FILE_TYPE,
    }
}

/// Remove tags, scripts and common entities from markup
pub fn strip_markup(markup: &str) -> String {
    let without_scripts = SCRIPT_PATTERN.replace_all(markup, " ");
    let text = TAG_PATTERN.replace_all(&without_scripts, " ");
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    normalize_whitespace(&decoded)
}

fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_PATTERN.replace_all(text, " ").trim().to_string()
}
