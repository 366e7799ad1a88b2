//! CLI adapter for olat-search
//!
//! Command-line front end for full index runs, searches and status.
//! Depends on `core/`; nothing in `core/` depends on it.
//!
//! # Architecture
//!
//! ```text
//! +------------------+      +------------------+
//! |      cli/        | ---> |      core/       |
//! | (clap adapter)   |      |  (domain logic)  |
//! +------------------+      +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// olat-search - full-text indexing for learning resources
///
/// Index folder trees, context help pages and portfolio maps into one
/// BM25 index, then search it as a given identity.
#[derive(Parser, Debug)]
#[command(name = "olat-index")]
#[command(version)]
#[command(about = "Full-text indexer for folders, help pages and portfolios", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full index over the given sources
    Index(commands::IndexArgs),

    /// Search the index as an identity
    Search(commands::SearchArgs),

    /// Show the status of the last full index
    Status(commands::StatusArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  olat-index completions bash > ~/.local/share/bash-completion/completions/olat-index
    ///   zsh:   olat-index completions zsh > ~/.zfunc/_olat-index
    ///   fish:  olat-index completions fish > ~/.config/fish/completions/olat-index.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    xdg.log_paths();
    xdg.ensure_dirs_exist()?;

    let mut config = Config::load_with_xdg(&xdg)?;
    if let Commands::Index(args) = &cli.command {
        args.apply_overrides(&mut config);
        config.validate()?;
    }
    config.log_config();

    let services = Arc::new(Services::new(config));

    match cli.command {
        Commands::Index(args) => commands::index::execute(args, &services, cli.format).await,
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::Status(args) => commands::status::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => {
            commands::config::execute(args, &services, &xdg, cli.format).await
        }
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
