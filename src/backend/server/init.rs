/**
 * Server Initialization
 *
 * # Initialization Process
 *
 * 1. Load the database pool, if configured
 * 2. Pick the store: PostgreSQL with a pool, in-memory without
 * 3. Build the mailer from the SMTP settings
 * 4. Wire `AppState` and create the router
 */

use std::sync::Arc;

use axum::Router;
use thiserror::Error;

use crate::backend::mail::{create_mailer, MailError};
use crate::backend::routes::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::backend::store::{MemoryStore, PgStore, Store};
use crate::shared::AppConfig;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("mailer: {0}")]
    Mail(#[from] MailError),
}

/// Create and configure the Axum application
pub async fn create_app(config: AppConfig) -> Result<Router<()>, InitError> {
    tracing::info!("Initializing dayplanner backend server");

    let store: Arc<dyn Store> = match load_database(&config).await {
        Some(pool) => Arc::new(PgStore::new(pool)),
        None => Arc::new(MemoryStore::new()),
    };

    let mailer = create_mailer(config.smtp.as_ref())?;
    if config.recaptcha.is_none() {
        tracing::warn!("reCAPTCHA not configured. /auth/captcha will fail.");
    }

    let app_state = AppState::new(config, store, mailer);
    let app = create_router(app_state);

    tracing::info!("Router configured");
    Ok(app)
}
