//! Config command - show current configuration

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also list supported file extensions
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    pub config_file: String,
    pub data_dir: String,
    #[serde(flatten)]
    pub config: &'a Config,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    xdg: &XdgDirs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = services.config.as_ref();
    let response = ConfigResponse {
        config_file: xdg.config_file().to_string_lossy().into_owned(),
        data_dir: xdg.data_dir.to_string_lossy().into_owned(),
        config,
    };

    match format {
        OutputFormat::Human => {
            let indexing = &config.indexing;
            println!("{}", colors::label("Configuration:"));
            println!("  config_file: {}", colors::file_path(&response.config_file));
            println!("  data_dir: {}", colors::file_path(&response.data_dir));
            println!("  indexing:");
            println!("    multi_threaded: {}", indexing.multi_threaded);
            println!("    worker_pool_size: {}", indexing.worker_pool_size);
            println!(
                "    worker_acquire_timeout_ms: {}",
                indexing.worker_acquire_timeout_ms
            );
            println!("    batch_size: {}", indexing.batch_size);
            println!("    partial_indexers: {}", indexing.partial_indexers);
            println!("    max_file_size_mb: {}", indexing.max_file_size_mb);
            println!("    exclude_patterns: {:?}", indexing.exclude_patterns);
            if args.all {
                println!(
                    "    supported_extensions: {:?}",
                    indexing.supported_extensions
                );
            }
            println!("  storage:");
            println!(
                "    index_dir: {}",
                colors::file_path(&config.storage.index_dir.display().to_string())
            );
            println!("  search:");
            println!("    default_k: {}", config.search.default_k);
            println!("    max_k: {}", config.search.max_k);
            println!("  help:");
            println!("    enabled_locales: {:?}", config.help.enabled_locales);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
