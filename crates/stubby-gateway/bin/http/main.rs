mod cli;
mod telemetry;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use stubby_core::Shortener;
use stubby_gateway::{App, AppState};
use stubby_generator::HashCodeGenerator;
use stubby_shortener::{ShortenerService, ShortenerSettings};
use stubby_storage::{InMemoryUrlStore, MySqlUrlStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    telemetry::init(config.log_format).context("failed to initialise tracing")?;

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        max_retries = config.max_retries,
        "starting gateway server"
    );

    let settings = ShortenerSettings::builder()
        .max_retries(config.max_retries)
        .build();

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(
            ShortenerService::new(InMemoryUrlStore::new(), HashCodeGenerator::new())
                .with_settings(settings),
        ),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let store = MySqlUrlStore::connect(mysql_dsn, config.mysql_max_connections)
                .await
                .context("failed to connect to mysql")?;
            store
                .ensure_schema()
                .await
                .context("failed to create the url_mappings table")?;

            Arc::new(
                ShortenerService::new(store, HashCodeGenerator::new()).with_settings(settings),
            )
        }
    };

    let app = App::router(AppState::new(shortener, config.public_base_url));

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server failed")?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
