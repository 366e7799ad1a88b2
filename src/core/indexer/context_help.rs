//! Context help pages.
//!
//! Each help page is a small template rendered once per enabled locale.
//! Rendering only resolves translation lookups; any other template call
//! is dropped, so indexing never has side effects.

use crate::core::context::{BusinessControl, ContextEntry, SearchResourceContext};
use crate::core::error::Result;
use crate::core::indexer::file_document::strip_markup;
use crate::core::indexer::full::DocumentSink;
use crate::core::indexer::producer::Indexer;
use crate::core::types::{Identity, IndexDocument, Roles};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

pub const CONTEXT_HELP_TYPE: &str = "type.contexthelp";
pub const CONTEXT_HELP_RESOURCE: &str = "ContextHelp";

static TRANSLATE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\$r\.translate\(\s*"([^"]*)"\s*\)"#).unwrap());
static OTHER_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$r\.\w+\([^)]*\)").unwrap());
static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$!?\{?([A-Za-z](?:[A-Za-z0-9_.]*[A-Za-z0-9_])?)\}?").unwrap());

/// Translation table of one bundle in one locale
pub type Translations = HashMap<String, String>;

/// A help page template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPage {
    pub bundle: String,
    pub page: String,
    /// Translation key of the page title
    pub title_key: String,
    pub template: String,
}

/// Where help pages and their translations come from
pub trait HelpPageSource: Send + Sync {
    fn pages(&self) -> Result<Vec<HelpPage>>;

    /// Translations of `bundle` in `locale`; empty when none exist
    fn translations(&self, locale: &str, bundle: &str) -> Result<Translations>;
}

/// Help pages held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticHelpSource {
    pages: Vec<HelpPage>,
    translations: HashMap<(String, String), Translations>,
}

impl StaticHelpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, bundle: &str, page: &str, title_key: &str, template: &str) -> Self {
        self.pages.push(HelpPage {
            bundle: bundle.to_string(),
            page: page.to_string(),
            title_key: title_key.to_string(),
            template: template.to_string(),
        });
        self
    }

    pub fn with_translation(mut self, locale: &str, bundle: &str, key: &str, value: &str) -> Self {
        self.translations
            .entry((locale.to_string(), bundle.to_string()))
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl HelpPageSource for StaticHelpSource {
    fn pages(&self) -> Result<Vec<HelpPage>> {
        Ok(self.pages.clone())
    }

    fn translations(&self, locale: &str, bundle: &str) -> Result<Translations> {
        Ok(self
            .translations
            .get(&(locale.to_string(), bundle.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Help pages laid out on disk:
///
/// ```text
/// {root}/{bundle}/_content/{page}.html
/// {root}/{bundle}/_i18n/LocalStrings_{locale}.properties
/// ```
///
/// The title key of a page is `chelp.{page}.title`.
#[derive(Debug, Clone)]
pub struct DirectoryHelpSource {
    root: PathBuf,
}

impl DirectoryHelpSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn subdirectories(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
    }
}

impl HelpPageSource for DirectoryHelpSource {
    fn pages(&self) -> Result<Vec<HelpPage>> {
        let mut pages = Vec::new();

        for bundle in Self::subdirectories(&self.root).filter(|e| e.file_type().is_dir()) {
            let bundle_name = bundle.file_name().to_string_lossy().to_string();
            let content_dir = bundle.path().join("_content");
            if !content_dir.is_dir() {
                continue;
            }

            for entry in Self::subdirectories(&content_dir).filter(|e| e.file_type().is_file()) {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("html") {
                    continue;
                }
                let Some(page) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                pages.push(HelpPage {
                    bundle: bundle_name.clone(),
                    page: page.to_string(),
                    title_key: format!("chelp.{page}.title"),
                    template: fs::read_to_string(path)?,
                });
            }
        }

        Ok(pages)
    }

    fn translations(&self, locale: &str, bundle: &str) -> Result<Translations> {
        let path = self
            .root
            .join(bundle)
            .join("_i18n")
            .join(format!("LocalStrings_{locale}.properties"));
        if !path.exists() {
            return Ok(Translations::new());
        }
        Ok(parse_properties(&fs::read_to_string(path)?))
    }
}

/// Parse `key=value` lines; `#` and `!` start comments
pub fn parse_properties(contents: &str) -> Translations {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Resolve translation lookups in a help template
pub fn render_template(template: &str, translations: &Translations) -> String {
    let translated = TRANSLATE_CALL.replace_all(template, |caps: &Captures| {
        translations
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[1].to_string())
    });
    let without_calls = OTHER_CALL.replace_all(&translated, "");
    VARIABLE
        .replace_all(&without_calls, |caps: &Captures| {
            translations.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Indexes context help pages, one document per page and locale
pub struct ContextHelpIndexer {
    source: Arc<dyn HelpPageSource>,
    locales: Vec<String>,
}

impl ContextHelpIndexer {
    pub fn new(source: Arc<dyn HelpPageSource>, locales: Vec<String>) -> Self {
        Self { source, locales }
    }
}

impl Indexer for ContextHelpIndexer {
    fn supported_type_name(&self) -> &str {
        CONTEXT_HELP_TYPE
    }

    /// Help pages are public
    fn check_access(
        &self,
        _entry: &ContextEntry,
        _control: &BusinessControl,
        _identity: &Identity,
        _roles: &Roles,
    ) -> bool {
        true
    }

    fn do_index(
        &self,
        parent: &SearchResourceContext,
        sink: &Arc<dyn DocumentSink>,
    ) -> Result<()> {
        let pages = self.source.pages()?;
        let mut translations: BTreeMap<(String, String), Translations> = BTreeMap::new();

        tracing::info!(
            "Indexing {} context help pages in {} locales",
            pages.len(),
            self.locales.len()
        );

        for page in &pages {
            for locale in &self.locales {
                let key = (locale.clone(), page.bundle.clone());
                if !translations.contains_key(&key) {
                    let table = match self.source.translations(locale, &page.bundle) {
                        Ok(table) => table,
                        Err(e) => {
                            tracing::warn!(
                                "No translations for bundle '{}' in '{}': {}",
                                page.bundle,
                                locale,
                                e
                            );
                            Translations::new()
                        }
                    };
                    translations.insert(key.clone(), table);
                }
                let table = &translations[&key];

                let mut context = parent
                    .child()
                    .with_business_entry(CONTEXT_HELP_RESOURCE, 0);
                context.set_document_type(CONTEXT_HELP_TYPE);
                context.set_file_path(format!("{}/{}", page.bundle, page.page));
                context.set_locale(locale.as_str());

                let title = table
                    .get(&page.title_key)
                    .cloned()
                    .unwrap_or_else(|| page.page.clone());

                sink.add_document(IndexDocument {
                    title,
                    description: page.bundle.clone(),
                    content: strip_markup(&render_template(&page.template, table)),
                    resource_url: context.business_path().to_string(),
                    document_type: CONTEXT_HELP_TYPE.to_string(),
                    file_type: None,
                    file_path: context.file_path().map(str::to_string),
                    locale: context.locale().map(str::to_string),
                    last_modified: None,
                })?;
            }
        }

        Ok(())
    }
}
