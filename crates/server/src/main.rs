mod bootstrap;
mod health;
mod webhook;

use std::sync::Arc;

use anyhow::Result;

use tabel_bot::dispatch::{HttpDispatcher, MessageDispatcher, NoopDispatcher};
use tabel_core::config::{AppConfig, LoadOptions};
use tabel_core::resolver::AttendanceResolver;
use tabel_db::SqlAttendanceStore;

fn init_logging(config: &AppConfig) {
    use tabel_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let geofence = app.config.office.geofence()?;
    let store = Arc::new(SqlAttendanceStore::new(app.db_pool.clone()));
    let resolver = Arc::new(AttendanceResolver::new(geofence, store));

    let dispatcher: Arc<dyn MessageDispatcher> = match &app.config.bot.api_base_url {
        Some(base_url) => {
            Arc::new(HttpDispatcher::new(base_url.clone(), Some(app.config.bot.token.clone())))
        }
        None => Arc::new(NoopDispatcher::default()),
    };

    tracing::info!(
        event_name = "system.server.dispatch_mode",
        dispatch_mode = if app.config.bot.api_base_url.is_some() { "http" } else { "noop" },
        correlation_id = "bootstrap",
        "outbound dispatch mode initialized"
    );

    let router = health::router(app.db_pool.clone())
        .merge(webhook::router(resolver, dispatcher));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        correlation_id = "bootstrap",
        "tabel-server started"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "tabel-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
