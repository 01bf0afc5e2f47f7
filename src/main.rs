use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shortener::api::create_router;
use shortener::config::Config;
use shortener::storage::{CachedStorage, SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Open storage
    info!("Using SQLite storage: {}", config.database.url);
    let sqlite = SqliteStorage::open(
        &config.database.url,
        config.database.max_connections,
        config.short_code_max_length,
    )
    .await?;
    info!(
        "Database initialized (code length {}, max hash {})",
        config.short_code_max_length,
        sqlite.max_hash()
    );

    let storage: Arc<dyn Storage> = if config.cache.max_entries > 0 {
        info!("Resolve cache enabled ({} entries)", config.cache.max_entries);
        Arc::new(CachedStorage::new(Arc::new(sqlite), config.cache.max_entries))
    } else {
        Arc::new(sqlite)
    };

    let app = create_router(Arc::clone(&storage));

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Shortener listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing storage");
    storage.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
