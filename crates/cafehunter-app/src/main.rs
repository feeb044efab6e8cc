//! Cafe Hunter binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize logging
//! 3. Open the SQLite cafe store, importing a dataset if asked
//! 4. Build the classifier, geocoder and Messenger clients
//! 5. Start the axum webhook server

mod cli;

use std::sync::Arc;

use clap::Parser;

use cafehunter_api::routes;
use cafehunter_api::state::AppState;
use cafehunter_api::GraphMessenger;
use cafehunter_chat::DialogueEngine;
use cafehunter_core::config::CafeHunterConfig;
use cafehunter_nlu::LuisClassifier;
use cafehunter_places::GoogleGeocoder;
use cafehunter_spatial::SpatialStore;
use cafehunter_storage::{CafeImporter, CafeRepository, Database};

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let mut config = CafeHunterConfig::load_or_default(&config_file);
    args.apply(&mut config);
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // === Storage ===

    let db_path = config.general.database_path();
    let db = Arc::new(Database::new(&db_path)?);
    let cafes = CafeRepository::new(db);

    if let Some(ref dataset) = args.import {
        let summary = CafeImporter::new(config.spatial.index_precision).import_file(&cafes, dataset)?;
        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            path = %dataset.display(),
            "Dataset import finished"
        );
    }

    let cafe_count = cafes.count()?;
    if cafe_count == 0 {
        tracing::warn!("Cafe store is empty; every search will come back with nothing nearby");
    }
    tracing::info!(path = %db_path.display(), cafes = cafe_count, "Cafe store ready");

    // === Remote services ===

    let classifier = Arc::new(LuisClassifier::new(&config.classifier)?);
    let resolver = Arc::new(GoogleGeocoder::new(&config.geocoder)?);
    let messenger = Arc::new(GraphMessenger::new(&config.messenger)?);
    if config.messenger.verify_token.is_empty() {
        tracing::warn!("messenger.verify_token is empty; webhook verification will always fail");
    }

    let store: Arc<dyn SpatialStore> = Arc::new(cafes.clone());
    let engine = DialogueEngine::new(&config, classifier, resolver, store);

    // === Webhook server ===

    let addr = format!("{}:{}", config.general.bind_address, config.general.port);
    let state = AppState::new(config, engine, messenger, cafes);
    let router = routes::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind webhook server");
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "Webhook server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
