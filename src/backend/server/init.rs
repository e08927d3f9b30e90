/**
 * Server Initialization
 *
 * Builds the process-wide resources once (HTTP client, database pool,
 * adapters, translator) and assembles the router around them.
 *
 * # Initialization Process
 *
 * 1. Create the shared `reqwest::Client`
 * 2. Connect the database pool (optional)
 * 3. Register one adapter per configured backend
 * 4. Build the translator chain
 * 5. Create the router
 */

use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::layout::LayoutService;
use crate::shared::config::AppConfig;
use crate::store::{DatabaseStore, DiskStore, GitHubStore, MemoryStore, StoreRegistry};
use crate::translator::{SetupError, Translator};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum InitError {
    #[error("JWT_SECRET is required")]
    MissingJwtSecret,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Translator(#[from] SetupError),
}

/// Create and configure the Axum application
pub async fn create_app(config: &AppConfig) -> Result<Router<()>, InitError> {
    tracing::info!("Initializing layout server");

    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let db_pool = load_database(config.database_url.as_deref()).await;

    let state = build_state(config, client, db_pool)?;
    tracing::info!(
        "Backends available: {:?} (default {})",
        state.stores.backends(),
        state.stores.default_backend()
    );

    Ok(create_router(state))
}

/// Assemble `AppState` from already created process-wide resources
pub fn build_state(
    config: &AppConfig,
    client: reqwest::Client,
    db_pool: Option<PgPool>,
) -> Result<AppState, InitError> {
    let jwt_secret = config
        .jwt_secret
        .clone()
        .ok_or(InitError::MissingJwtSecret)?;

    let mut stores = StoreRegistry::new(config.effective_default_backend())
        .with_store(Arc::new(MemoryStore::new()));
    if let Some(disk) = &config.disk {
        stores = stores.with_store(Arc::new(DiskStore::new(client.clone(), disk)));
    }
    if let Some(github) = &config.github {
        stores = stores.with_store(Arc::new(GitHubStore::new(client.clone(), github)));
    }
    if let Some(pool) = db_pool {
        stores = stores.with_store(Arc::new(DatabaseStore::new(pool)));
    }
    if stores.select(None).is_none() {
        tracing::error!(
            "Default backend {} is not available; requests without ?backend= will fail",
            stores.default_backend()
        );
    }

    let translator = Translator::from_config(config, client)?;
    tracing::info!("Translator stages: {:?}", translator.stage_names());

    Ok(AppState::new(
        stores,
        LayoutService::new(Arc::new(translator)),
        jwt_secret,
    ))
}
