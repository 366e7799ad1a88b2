//! Index-time access rules.
//!
//! A rule is a hard filter: a rejected container is never listed and a
//! rejected leaf never becomes a document.

use crate::core::error::{IndexerError, Result};
use crate::core::vfs::VfsItem;
use glob::Pattern;
use std::sync::Arc;

/// Decides whether an item may be indexed
pub trait AccessRule: Send + Sync {
    fn allowed(&self, item: &VfsItem) -> bool;
}

impl<F> AccessRule for F
where
    F: Fn(&VfsItem) -> bool + Send + Sync,
{
    fn allowed(&self, item: &VfsItem) -> bool {
        self(item)
    }
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessRule for AllowAll {
    fn allowed(&self, _item: &VfsItem) -> bool {
        true
    }
}

/// Rejects dot-prefixed names and items flagged hidden
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipHidden;

impl AccessRule for SkipHidden {
    fn allowed(&self, item: &VfsItem) -> bool {
        !(item.name().starts_with('.') || item.metadata().hidden)
    }
}

/// Rejects items whose name matches any glob pattern
#[derive(Debug, Clone)]
pub struct ExcludePatterns {
    patterns: Vec<Pattern>,
}

impl ExcludePatterns {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    IndexerError::ConfigError(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

impl AccessRule for ExcludePatterns {
    fn allowed(&self, item: &VfsItem) -> bool {
        let name = item.name();
        if let Some(pattern) = self.patterns.iter().find(|p| p.matches(name)) {
            tracing::debug!("Excluded by pattern '{}': {}", pattern.as_str(), name);
            return false;
        }
        true
    }
}

/// Accepts an item only if every inner rule accepts it
#[derive(Clone, Default)]
pub struct AllOf {
    rules: Vec<Arc<dyn AccessRule>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: impl AccessRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }
}

impl AccessRule for AllOf {
    fn allowed(&self, item: &VfsItem) -> bool {
        self.rules.iter().all(|rule| rule.allowed(item))
    }
}

/// The rule used for folder resources: no hidden items, no excluded names
pub fn default_folder_rule(exclude_patterns: &[String]) -> Result<Arc<dyn AccessRule>> {
    Ok(Arc::new(
        AllOf::new()
            .with(SkipHidden)
            .with(ExcludePatterns::new(exclude_patterns)?),
    ))
}
