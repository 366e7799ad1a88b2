//! Status command - show the outcome of the last full index

use crate::cli::output::{colors, format_bytes, format_duration, format_relative_time, print_header};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::storage::IndexMeta;
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also list per-part document counts
    #[arg(long, short = 'p')]
    pub parts: bool,
}

/// Execute the status command
pub async fn execute(
    args: StatusArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = services.index_store();
    let meta = store
        .load_meta()
        .map_err(|e| format!("{e}. Run 'olat-index index <path>' first."))?;

    match format {
        OutputFormat::Human => print_human(&args, &meta, &store.index_dir().display().to_string()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
    }

    Ok(())
}

fn print_human(args: &StatusArgs, meta: &IndexMeta, index_dir: &str) {
    print_header(&format!("Index at {}", colors::file_path(index_dir)));

    let sources = &meta.sources;
    if let Some(root) = &sources.root {
        println!("  folder:     {}", colors::file_path(&root.display().to_string()));
    }
    if let Some(help_dir) = &sources.help_dir {
        println!("  help:       {}", colors::file_path(&help_dir.display().to_string()));
    }
    if let Some(portfolio) = &sources.portfolio_file {
        println!("  portfolio:  {}", colors::file_path(&portfolio.display().to_string()));
    }
    println!("  size:       {}", colors::number(&format_bytes(meta.index_size_bytes)));
    println!("  schema:     v{}", meta.schema_version);

    let Some(status) = &meta.last_status else {
        println!("  {}", colors::warning("No completed run recorded"));
        return;
    };

    if let Some(indexed_at) = &meta.last_indexed_at {
        println!(
            "  indexed:    {} {}",
            indexed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            colors::dim(&format!("({})", format_relative_time(indexed_at)))
        );
    }
    println!("  state:      {:?}", status.state);
    println!(
        "  documents:  {} in {} ({}/min)",
        colors::number(&status.document_count.to_string()),
        format_duration(status.full_indexing_time_ms as f64 / 1000.0),
        status.index_per_minute
    );
    println!(
        "  excluded:   {}",
        colors::number(&status.excluded_document_count.to_string())
    );

    for (document_type, count) in &status.document_counters {
        println!(
            "    {} {}",
            colors::doc_type(document_type),
            colors::number(&count.to_string())
        );
    }

    if args.parts {
        for (part, count) in status.part_document_counts.iter().enumerate() {
            println!("    part {part}: {}", colors::number(&count.to_string()));
        }
    }
}
