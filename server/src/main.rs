// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Notice Reply Server
//!
//! Binary entry point: loads the YAML configuration manifest, wires the
//! object store, repositories and reply backend behind the HTTP API, and
//! serves until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use notice_reply_core::application::{StandardNoticeService, StandardUploadService};
use notice_reply_core::domain::config::ServiceConfig;
use notice_reply_core::domain::repository::{ActivityRepository, CurrentDataRepository};
use notice_reply_core::infrastructure::auth::SessionVerifier;
use notice_reply_core::infrastructure::db::Database;
use notice_reply_core::infrastructure::reply::HttpReplyGenerator;
use notice_reply_core::infrastructure::repositories::{
    InMemoryActivityRepository, InMemoryCurrentDataRepository, PostgresActivityRepository,
    PostgresCurrentDataRepository,
};
use notice_reply_core::infrastructure::storage::create_object_store;
use notice_reply_core::presentation::{app, AppState};

/// Notice-reply web service
#[derive(Parser)]
#[command(name = "notice-reply")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, env = "NOTICE_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bind host (overrides the manifest)
    #[arg(long, env = "NOTICE_HOST")]
    host: Option<String>,

    /// Bind port (overrides the manifest)
    #[arg(long, env = "NOTICE_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NOTICE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    let (activities, snapshots): (Arc<dyn ActivityRepository>, Arc<dyn CurrentDataRepository>) =
        match &config.database.url {
            Some(url) => {
                let db = Database::new(url, config.database.max_connections)
                    .await
                    .context("Failed to connect to Postgres")?;
                info!("Connected to Postgres");
                (
                    Arc::new(PostgresActivityRepository::new(db.get_pool().clone())),
                    Arc::new(PostgresCurrentDataRepository::new(db.get_pool().clone())),
                )
            }
            None => {
                info!("No database configured, using in-memory repositories");
                (
                    Arc::new(InMemoryActivityRepository::new()),
                    Arc::new(InMemoryCurrentDataRepository::new()),
                )
            }
        };

    let store = create_object_store(&config.storage).context("Failed to initialize storage")?;
    store
        .health_check()
        .await
        .context("Object store health check failed")?;

    let generator = Arc::new(HttpReplyGenerator::new(config.reply_backend.base_url.clone()));

    let state = Arc::new(AppState {
        uploads: Arc::new(StandardUploadService::new(store.clone(), activities.clone())),
        notices: Arc::new(StandardNoticeService::new(activities, snapshots.clone())),
        store,
        generator,
        snapshots,
        verifier: SessionVerifier::new(&config.auth.session_secret),
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutting down");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
