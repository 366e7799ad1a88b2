//! Query preprocessing.
//!
//! Users paste file paths and business paths into the search box. Both
//! contain characters the Tantivy query parser treats as syntax:
//! - File paths: `/course/week1/notes.txt` -> `"/course/week1/notes.txt"`
//! - Business paths: `[Folder:12]` -> `"[Folder:12]"`
//!
//! A literal mode escapes every special character instead.

use crate::core::error::{IndexerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static PATH_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/[\w./\-]+$").unwrap());

static BUSINESS_PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\[[^:\[\]]+:-?\d+\])+$").unwrap());

// Potential field prefix (word:nonspace); position checked in code
static FIELD_PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+):([^\s:])").unwrap());

/// Fields a query may address explicitly
pub const VALID_FIELDS: [&str; 7] = [
    "title",
    "description",
    "content",
    "document_type",
    "file_type",
    "file_path",
    "locale",
];

/// Prepare a raw query for the Tantivy query parser.
///
/// ```
/// use olat_search::core::search::preprocess_query;
///
/// assert_eq!(preprocess_query("/course/a.txt", false), "\"/course/a.txt\"");
/// assert_eq!(preprocess_query("[Folder:12]", false), "\"[Folder:12]\"");
/// assert_eq!(preprocess_query("title:intro", true), "title\\:intro");
/// ```
pub fn preprocess_query(query: &str, literal: bool) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if literal {
        return escape_all_special(trimmed);
    }

    let quoted = trimmed.len() > 1 && trimmed.starts_with('"') && trimmed.ends_with('"');
    if !quoted && (PATH_PATTERN.is_match(trimmed) || BUSINESS_PATH_PATTERN.is_match(trimmed)) {
        return format!("\"{trimmed}\"");
    }

    trimmed.to_string()
}

fn escape_all_special(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for ch in s.chars() {
        if matches!(
            ch,
            ':' | '{' | '}' | '[' | ']' | '(' | ')' | '@' | '"' | '\\' | '+' | '-' | '!' | '^'
                | '~' | '*'
        ) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Reject field prefixes that do not exist in the index schema
pub fn validate_query_fields(query: &str) -> Result<()> {
    let trimmed = query.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') {
        return Ok(());
    }

    for cap in FIELD_PREFIX_PATTERN.captures_iter(query) {
        let Some(whole) = cap.get(0) else { continue };
        let field = &cap[1];

        // Only a prefix at the start of a term counts
        let preceded_by_text = query[..whole.start()]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_whitespace() && c != '(');
        if preceded_by_text {
            continue;
        }

        if VALID_FIELDS.contains(&field) || matches!(field, "http" | "https" | "ftp" | "mailto") {
            continue;
        }

        let hint = match suggest_field_alias(field) {
            Some(alias) => format!(" Did you mean '{alias}'?"),
            None => String::new(),
        };
        return Err(IndexerError::InvalidQuery(format!(
            "Unknown field '{field}'.{hint} Valid fields: {}",
            VALID_FIELDS.join(", ")
        )));
    }

    Ok(())
}

fn suggest_field_alias(field: &str) -> Option<&'static str> {
    match field.to_lowercase().as_str() {
        "file" | "filename" | "path" | "filepath" => Some("file_path"),
        "type" | "doctype" | "kind" => Some("document_type"),
        "text" | "body" => Some("content"),
        "name" | "subject" => Some("title"),
        "lang" | "language" => Some("locale"),
        _ => None,
    }
}
