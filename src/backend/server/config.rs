/**
 * Server Configuration
 *
 * Loads the optional PostgreSQL connection pool named by
 * `AppConfig::database_url`.
 *
 * # Error Handling
 *
 * Connection errors are logged but do not prevent server startup. Without
 * a pool the server runs on the in-memory store, which loses everything
 * on restart.
 */

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::shared::AppConfig;

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

const MAX_CONNECTIONS: u32 = 10;

/// Connect to the configured database and run pending migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is configured and reachable
/// - `None` if `DATABASE_URL` is not set or the connection fails
pub async fn load_database(config: &AppConfig) -> DatabaseConfig {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Using the in-memory store.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
