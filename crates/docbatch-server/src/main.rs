//! Docbatch Server - Main entry point

use anyhow::Result;
use docbatch_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tracing::{info, warn};

use docbatch_server::{
    api,
    config::Config,
    db::{self, DbConfig},
    ingest::OrphanSweeper,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("docbatch-server")
        .filter_directives("docbatch_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting docbatch server");

    let config = Config::load()?;
    info!(
        write_mode = %config.ingest.write_mode,
        target_suffix = %config.ingest.target_suffix,
        "Configuration loaded - server will bind to {}:{}",
        config.server.host,
        config.server.port
    );

    let db_pool = db::create_pool(&DbConfig::from(&config.database)).await?;
    info!("Database connection pool established");

    db::run_migrations(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database migrations completed");

    let sweeper_handle = match config.ingest.orphan_sweep {
        Some(sweep_config) => {
            let handle = OrphanSweeper::new(db_pool.clone(), sweep_config).start();
            Some(handle)
        },
        None => {
            info!("Orphan sweep disabled (ORPHAN_SWEEP_INTERVAL_SECS not set)");
            None
        },
    };

    let app = api::create_router(db_pool.clone(), &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    api::serve(listener, app, shutdown_signal(), grace).await?;

    if let Some(handle) = sweeper_handle {
        handle.abort();
    }
    db_pool.close().await;

    info!("Server shut down gracefully");

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
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

    info!("Shutting down gracefully");
}
