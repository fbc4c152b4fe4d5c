//! Create the database schema and optionally seed development data.
//!
//! Usage: `setup_db [--with-sample-data]`

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genosense_service::{
    services::{
        sample_data::{seed_models, seed_points},
        InfectionRepository, SqliteStore,
    },
    Config,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setup_db=info,genosense_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    info!("Database tables created in {}", config.database_path.display());

    if !std::env::args().skip(1).any(|arg| arg == "--with-sample-data") {
        info!("To add sample data, run: setup_db --with-sample-data");
        return Ok(());
    }

    if store.count_models()? == 0 {
        store.add_models(&seed_models())?;
        info!("Sample prediction models added");
    }
    for model in store.list_models()? {
        info!(
            "Model {} ({}) accuracy {:?}",
            model.name, model.model_type, model.accuracy
        );
    }

    if store.count_points()? == 0 {
        let inserted = store.add_points(&seed_points(&mut rand::thread_rng()))?;
        info!("{} sample infection points added", inserted);
    }

    info!("Setup complete");
    Ok(())
}
