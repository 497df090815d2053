/**
 * Router Configuration
 *
 * Combines every route group into a single Axum router.
 *
 * # Route Order
 *
 * 1. Liveness (`GET /`)
 * 2. Auth routes
 * 3. Resource routes
 * 4. Uploaded files under `/uploads`
 * 5. Fallback (404)
 *
 * Every request is traced with `TraceLayer`.
 */

use axum::{http::StatusCode, response::Json, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::auth_routes::configure_auth_routes;
use crate::backend::server::state::AppState;

async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Api is running!" }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "Not found" })))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/", get(liveness));

    let router = configure_auth_routes(router, &app_state);
    let router = configure_api_routes(router, &app_state);

    let router = router.nest_service("/uploads", ServeDir::new(&app_state.config.upload_dir));

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
