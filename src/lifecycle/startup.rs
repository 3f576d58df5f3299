//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table from the declared handlers
//! - Start the metrics exporter
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The route table is complete before the listener is bound

use thiserror::Error;
use tokio::net::TcpListener;

use crate::api;
use crate::config::{ConfigError, ServerConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{RouteError, RouteTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("route table error: {0}")]
    Routes(#[from] RouteError),

    #[error("metrics exporter error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Expand and register every API handler.
pub fn build_route_table(config: &ServerConfig) -> Result<RouteTable, StartupError> {
    let table = api::registry(config.versioning.clone()).build()?;
    Ok(table)
}

/// Build the route table, bind, and serve until shutdown.
pub async fn run(config: ServerConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let table = build_route_table(&config)?;

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        routes = table.len(),
        "Listening for connections"
    );

    HttpServer::new(config, table)
        .run(listener, shutdown.subscribe())
        .await?;
    Ok(())
}
