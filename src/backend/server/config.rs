/**
 * Server Configuration
 *
 * Loads the application configuration and the optional PostgreSQL pool.
 *
 * # Configuration Sources
 *
 * `AppConfig::from_env` reads the TOML file named by `LAYOUT_CONFIG` (if
 * any) and overlays environment variables on top of it.
 *
 * # Error Handling
 *
 * A bad configuration stops startup. A database that cannot be reached
 * does not: the pool is set to `None`, the database backend is left out of
 * the registry and the other backends keep working.
 */

use sqlx::PgPool;

use crate::shared::config::{AppConfig, ConfigError};

/// Load and validate the application configuration
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        "Configuration loaded (port {}, default backend {})",
        config.port,
        config.effective_default_backend()
    );
    Ok(config)
}

/// Connect to the database and run migrations
///
/// - `Some(PgPool)` if the database is configured and reachable
/// - `None` if no URL is configured or the connection fails
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Database backend will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database backend will be disabled.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
