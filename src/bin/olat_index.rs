//! olat-index - command-line front end for the indexing core
//!
//! # Examples
//!
//! ```bash
//! # Index a folder tree, help pages and portfolio maps
//! olat-index index /srv/course --help-dir /srv/help --portfolio maps.json
//!
//! # Search as a guest
//! olat-index search "ownership" --guest
//!
//! # Show the last run
//! olat-index status
//! ```

use clap::Parser;
use olat_search::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "olat_search=info".into());

    // Logs go to stderr so JSON output on stdout stays clean
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
