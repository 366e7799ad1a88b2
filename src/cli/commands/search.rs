//! Search command - query the index as a given identity

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::search::SearchService;
use crate::core::services::Services;
use crate::core::types::{Identity, Roles, SearchResponse};
use clap::Args;
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (supports boolean operators: AND, OR, NOT)
    pub query: String,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Search as an anonymous guest
    #[arg(long, conflicts_with_all = ["author", "admin"])]
    pub guest: bool,

    /// Search with author rights
    #[arg(long, conflicts_with = "admin")]
    pub author: bool,

    /// Search with administrator rights
    #[arg(long)]
    pub admin: bool,

    /// Identity key to search as
    #[arg(long, default_value_t = 1)]
    pub identity: i64,

    /// Only show resource URLs
    #[arg(long)]
    pub urls_only: bool,
}

impl SearchArgs {
    /// Identity and roles the search runs as
    pub fn principal(&self) -> (Identity, Roles) {
        if self.guest {
            return (Identity::anonymous(), Roles::anonymous());
        }

        let roles = if self.admin {
            Roles::administrator()
        } else if self.author {
            Roles::author()
        } else {
            Roles::user()
        };
        (Identity::new(self.identity, format!("user{}", self.identity)), roles)
    }
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = services.index_store();
    let meta = store
        .load_meta()
        .map_err(|e| format!("{e}. Run 'olat-index index <path>' first."))?;
    let index = Arc::new(store.open()?);
    let registry = Arc::new(services.build_registry(&meta.sources)?);

    let search = SearchService::new(
        index,
        registry,
        services.config.search.default_k,
        services.config.search.max_k,
    );

    let (identity, roles) = args.principal();
    let response = search.search(&args.query, &identity, &roles, args.limit)?;

    match format {
        OutputFormat::Human => print_human(&args, &response),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn print_human(args: &SearchArgs, response: &SearchResponse) {
    if response.hits.is_empty() {
        println!("No results found for '{}'", colors::label(&args.query));
    } else {
        println!(
            "Found {} result(s) in {}ms:\n",
            colors::number(&response.hits.len().to_string()),
            response.duration_ms
        );
    }

    for (i, hit) in response.hits.iter().enumerate() {
        if args.urls_only {
            println!("{}", colors::file_path(&hit.resource_url));
            continue;
        }

        println!(
            "[{}] {} {}",
            colors::rank(&(i + 1).to_string()),
            colors::label(&hit.title),
            colors::score(&format!("(score: {:.2})", hit.score))
        );
        print!(
            "    {} {}",
            colors::doc_type(&hit.document_type),
            colors::file_path(&hit.resource_url)
        );
        if let Some(path) = &hit.file_path {
            print!(" {}", colors::file_path(path));
        }
        if let Some(locale) = &hit.locale {
            print!(" {}", colors::dim(&format!("[{locale}]")));
        }
        println!();
        if !hit.description.is_empty() {
            println!("    {}", colors::dim(&hit.description));
        }
        println!();
    }

    if response.filtered > 0 {
        println!(
            "{}",
            colors::dim(&format!(
                "{} hit(s) hidden by access rules",
                response.filtered
            ))
        );
    }
}
