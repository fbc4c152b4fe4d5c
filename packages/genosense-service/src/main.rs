use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genosense_service::{router, services::SqliteStore, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genosense_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        "Starting genosense service (debug endpoints {})",
        if config.debug { "enabled" } else { "disabled" }
    );

    tokio::fs::create_dir_all(&config.upload_folder)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_folder.display()))?;

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    info!("Using database {}", config.database_path.display());

    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let app = router(AppState::new(config, store));

    info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("HTTP server failed")?;

    info!("Shutting down...");
    Ok(())
}
