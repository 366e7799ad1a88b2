//! Resource contexts and business paths.
//!
//! A [`SearchResourceContext`] is the cursor describing where in the
//! domain the item being indexed lives. Every nested recursion works on
//! its own derived copy, so concurrent branches never share one.
//!
//! Business paths use the `[Type:id][Type:id]` notation. At query time
//! they are parsed back into a [`BusinessControl`] to route access checks
//! to the indexer that produced the hit.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static ENTRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^:\[\]]+):(-?\d+)\]").expect("valid business path regex"));

/// Mutable cursor describing the location of the current item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResourceContext {
    business_path: String,
    document_type: String,
    file_path: Option<String>,
    parent_title: Option<String>,
    locale: Option<String>,
    last_modified: Option<DateTime<Utc>>,
}

impl SearchResourceContext {
    /// Empty context for a top-level indexing call
    pub fn root() -> Self {
        Self::default()
    }

    /// Derive an independent context for nested recursion
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Append a `[Type:id]` entry to the business path
    pub fn with_business_entry(mut self, resource_type: &str, resource_id: i64) -> Self {
        self.push_business_entry(resource_type, resource_id);
        self
    }

    pub fn push_business_entry(&mut self, resource_type: &str, resource_id: i64) {
        self.business_path
            .push_str(&ContextEntry::new(resource_type, resource_id).to_string());
    }

    pub fn business_path(&self) -> &str {
        &self.business_path
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn set_document_type(&mut self, document_type: impl Into<String>) {
        self.document_type = document_type.into();
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, file_path: impl Into<String>) {
        self.file_path = Some(file_path.into());
    }

    pub fn parent_title(&self) -> Option<&str> {
        self.parent_title.as_deref()
    }

    pub fn set_parent_title(&mut self, title: impl Into<String>) {
        self.parent_title = Some(title.into());
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = Some(locale.into());
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn set_last_modified(&mut self, modified: Option<DateTime<Utc>>) {
        self.last_modified = modified;
    }
}

/// One `[Type:id]` element of a business path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextEntry {
    pub resource_type: String,
    pub resource_id: i64,
}

impl ContextEntry {
    pub fn new(resource_type: impl Into<String>, resource_id: i64) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id,
        }
    }
}

impl fmt::Display for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.resource_type, self.resource_id)
    }
}

/// Ordered list of context entries parsed from a business path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessControl {
    entries: Vec<ContextEntry>,
}

impl BusinessControl {
    pub fn new(entries: Vec<ContextEntry>) -> Self {
        Self { entries }
    }

    /// Parse a `[Type:id]...` string. Text between entries is ignored.
    pub fn parse(business_path: &str) -> Self {
        let entries = ENTRY_PATTERN
            .captures_iter(business_path)
            .filter_map(|caps| {
                let id = caps[2].parse::<i64>().ok()?;
                Some(ContextEntry::new(&caps[1], id))
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// The innermost entry, which names the indexed resource itself
    pub fn last_entry(&self) -> Option<&ContextEntry> {
        self.entries.last()
    }

    /// First entry of the given resource type
    pub fn find(&self, resource_type: &str) -> Option<&ContextEntry> {
        self.entries
            .iter()
            .find(|e| e.resource_type == resource_type)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for BusinessControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
