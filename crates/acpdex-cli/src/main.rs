//! acpdex - query and refresh the local ACP registry mirror
//!
//! ## Commands
//!
//! - `refresh`: fetch the full upstream listing and update the snapshot
//! - `search`: substring search over the local snapshot
//! - `agent`: look up one agent by wallet address
//! - `categorize`: bucket agents into products vs services
//! - `status`: snapshot age, size, and circuit breaker state
//!
//! Queries operate on the persisted snapshot; only `refresh` (and a cold
//! start with no snapshot at all) touches the network.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use acpdex_core::{
    categorize_agents, find_by_wallet, search_agents, RegistryCache, RegistryConfig,
};

#[derive(Parser)]
#[command(name = "acpdex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local mirror of the ACP agent registry", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the full upstream listing and update the local snapshot
    Refresh,

    /// Search the local snapshot by substring (name, description, offerings)
    Search {
        /// Text to search for, case-insensitive
        query: String,
    },

    /// Look up one agent by wallet address
    Agent {
        /// Wallet address, case-insensitive exact match
        wallet: String,
    },

    /// Bucket the snapshot into product vs service providers
    Categorize {
        /// Print agent names per bucket instead of counts only
        #[arg(long)]
        names: bool,
    },

    /// Show snapshot age, agent count, and circuit breaker state
    Status,
}

#[derive(Serialize)]
struct RefreshSummary {
    agents: usize,
    disposition: String,
    last_updated: Option<DateTime<Utc>>,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct StatusSummary {
    agents: usize,
    last_updated: Option<DateTime<Utc>>,
    breaker_state: String,
    cache_path: String,
    errors: Option<Vec<String>>,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("ACPDEX_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    let config = RegistryConfig::from_env();
    let cache = RegistryCache::new(&config);

    match cli.command {
        Commands::Refresh => {
            let report = cache.refresh().await;
            let summary = RefreshSummary {
                agents: report.snapshot.total_count,
                disposition: format!("{:?}", report.disposition),
                last_updated: report.snapshot.last_updated,
                errors: report.errors,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Search { query } => {
            let snapshot = cache.get_current_or_refresh().await;
            let hits = search_agents(&snapshot.agents, &query);
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }

        Commands::Agent { wallet } => {
            let snapshot = cache.get_current_or_refresh().await;
            match find_by_wallet(&snapshot.agents, &wallet) {
                Some(agent) => println!("{}", serde_json::to_string_pretty(agent)?),
                None => {
                    eprintln!("No agent with wallet {}", wallet);
                    std::process::exit(1);
                }
            }
        }

        Commands::Categorize { names } => {
            let snapshot = cache.get_current_or_refresh().await;
            let buckets = categorize_agents(&snapshot.agents);
            if names {
                let named = serde_json::json!({
                    "products": buckets.products.iter().map(|a| &a.name).collect::<Vec<_>>(),
                    "services": buckets.services.iter().map(|a| &a.name).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&named)?);
            } else {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "products": buckets.products.len(),
                        "services": buckets.services.len(),
                    }))?
                );
            }
        }

        Commands::Status => {
            let snapshot = cache.get_current();
            let summary = StatusSummary {
                agents: snapshot.total_count,
                last_updated: snapshot.last_updated,
                breaker_state: cache.breaker().state().to_string(),
                cache_path: config.cache_path.display().to_string(),
                errors: snapshot.error.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
