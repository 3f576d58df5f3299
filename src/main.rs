//! Versioned API server.
//!
//! # Architecture Overview
//!
//! ```text
//!   startup                                   runtime
//!   ───────                                   ───────
//!   HandlerGroup / HandlerDescriptor          Client Request
//!        │                                         │
//!        ▼                                         ▼
//!   ┌──────────┐   ┌──────────┐            ┌──────────────┐
//!   │ expander │──▶│ registry │──▶ table ─▶│  axum router │
//!   └──────────┘   └──────────┘            └──────┬───────┘
//!   /v1/tasks, /v2/tasks, ...                     │ criteria match
//!                                                 ▼
//!                                          ┌──────────────┐
//!                                          │   handler    │◀── ApiVersion
//!                                          └──────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use versioned_router::config::{load_config, ServerConfig};
use versioned_router::lifecycle::{startup, Shutdown};
use versioned_router::observability::logging;

#[derive(Parser)]
#[command(name = "versioned-router")]
#[command(about = "HTTP API server with version-range routing", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Default)]
enum Commands {
    /// Serve the API (default)
    #[default]
    Serve,
    /// Print the expanded route table as JSON and exit
    Routes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match cli.command.unwrap_or_default() {
        Commands::Routes => print_routes(&config),
        Commands::Serve => serve(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

fn print_routes(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let table = startup::build_route_table(config)?;
    println!("{}", serde_json::to_string_pretty(&table.summaries())?);
    Ok(())
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        min_api_version = config.versioning.min_api_version,
        max_api_version = config.versioning.max_api_version,
        "versioned-router starting"
    );

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
