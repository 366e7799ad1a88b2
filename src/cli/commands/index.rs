//! Index command - run a full index over folders, help pages and portfolios

use crate::cli::output::{colors, format_duration};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::indexer::status::StatusSnapshot;
use crate::core::services::Services;
use crate::core::storage::{IndexBackend, IndexMeta, IndexSources, MemoryIndex};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Folder tree to index as a folder resource
    pub path: Option<PathBuf>,

    /// Context help directory (`<bundle>/_content/*.html`)
    #[arg(long)]
    pub help_dir: Option<PathBuf>,

    /// JSON file with portfolio maps
    #[arg(long)]
    pub portfolio: Option<PathBuf>,

    /// Glob patterns to exclude (can be specified multiple times)
    #[arg(long, short = 'e')]
    pub exclude: Vec<String>,

    /// Walk folders on the calling thread
    #[arg(long, conflicts_with = "workers")]
    pub single_threaded: bool,

    /// Number of folder indexer workers
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Replace an existing index
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Collect documents in memory without writing an index
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl IndexArgs {
    /// Apply command line overrides to the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.single_threaded {
            config.indexing.multi_threaded = false;
        }
        if let Some(workers) = self.workers {
            config.indexing.multi_threaded = true;
            config.indexing.worker_pool_size = workers;
        }
    }

    fn sources(&self) -> Result<IndexSources, Box<dyn std::error::Error>> {
        let canonical = |path: &PathBuf| {
            path.canonicalize().map_err(|e| {
                format!(
                    "Invalid path '{}': {}. Make sure the path exists and is accessible.",
                    path.display(),
                    e
                )
            })
        };

        let sources = IndexSources {
            root: self.path.as_ref().map(canonical).transpose()?,
            help_dir: self.help_dir.as_ref().map(canonical).transpose()?,
            portfolio_file: self.portfolio.as_ref().map(canonical).transpose()?,
            exclude_patterns: self.exclude.clone(),
        };

        if sources.root.is_none() && sources.help_dir.is_none() && sources.portfolio_file.is_none()
        {
            return Err(
                "Nothing to index. Give a folder path, --help-dir or --portfolio.".into(),
            );
        }

        Ok(sources)
    }
}

/// Indexing result response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub index_dir: Option<String>,
    pub dry_run: bool,
    pub duration_secs: f64,
    #[serde(flatten)]
    pub status: StatusSnapshot,
}

/// Execute the index command
pub async fn execute(
    args: IndexArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = args.sources()?;
    let registry = services.build_registry(&sources)?;
    let store = services.index_store();

    let build = if args.dry_run {
        None
    } else {
        let meta = IndexMeta::new(sources.clone());
        Some(store.create(&meta, args.force).map_err(|e| {
            format!("{e}. Use --force to replace it, or --dry-run to index without writing.")
        })?)
    };
    let backend: Arc<dyn IndexBackend> = match &build {
        Some(build) => build.backend(),
        None => Arc::new(MemoryIndex::default()),
    };

    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Running {} indexer(s) into {}...",
            colors::number(&registry.len().to_string()),
            if args.dry_run {
                colors::dim("memory")
            } else {
                colors::file_path(&store.index_dir().display().to_string())
            }
        );
    }

    let full_indexer = services.full_indexer(backend);

    // Ctrl-C stops the run; the live index is only replaced after a full run
    let stopper = full_indexer.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.stop();
        }
    });

    let run = tokio::task::spawn_blocking(move || full_indexer.run(&registry)).await;
    ctrl_c.abort();
    // Release the stopper's handle on the backend before touching directories
    let _ = ctrl_c.await;

    let snapshot = match run? {
        Ok(snapshot) => snapshot,
        Err(e) => {
            if let Some(build) = build {
                build.discard();
            }
            return Err(e.into());
        }
    };

    let index_dir = match build {
        Some(build) => {
            build.publish()?;
            store.record_run(snapshot.clone())?;
            Some(store.index_dir().display().to_string())
        }
        None => None,
    };

    let response = IndexResponse {
        index_dir,
        dry_run: args.dry_run,
        duration_secs: snapshot.full_indexing_time_ms as f64 / 1000.0,
        status: snapshot,
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn print_human(response: &IndexResponse) {
    let status = &response.status;
    println!(
        "{} {} documents in {} ({} excluded)",
        colors::success("Indexed"),
        colors::number(&status.document_count.to_string()),
        colors::number(&format_duration(response.duration_secs)),
        colors::number(&status.excluded_document_count.to_string())
    );
    println!(
        "Throughput: {} documents/min",
        colors::number(&status.index_per_minute.to_string())
    );

    let parts: Vec<String> = status
        .part_document_counts
        .iter()
        .map(|count| count.to_string())
        .collect();
    println!("Parts: {}", colors::dim(&parts.join(" ")));

    if !status.document_counters.is_empty() {
        println!("{}", colors::label("Document types:"));
        for (document_type, count) in &status.document_counters {
            println!(
                "  {} {}",
                colors::doc_type(document_type),
                colors::number(&count.to_string())
            );
        }
    }
    if !status.file_type_counters.is_empty() {
        println!("{}", colors::label("File types:"));
        for (file_type, count) in &status.file_type_counters {
            println!(
                "  {} {}",
                colors::doc_type(file_type),
                colors::number(&count.to_string())
            );
        }
    }
}
