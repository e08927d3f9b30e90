/**
 * Router Configuration
 *
 * Combines the public and protected routes into one Axum router.
 *
 * # Route Order
 *
 * 1. Layout API routes, wrapped in the auth middleware via `route_layer`
 *    (so unmatched paths still reach the fallback instead of a 401)
 * 2. Public `GET /health`
 * 3. JSON 404 fallback
 * 4. `TraceLayer` around everything
 */

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = configure_api_routes(Router::new())
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Liveness plus the backends this process can serve
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backends": state.stores.backends(),
        "default_backend": state.stores.default_backend(),
    }))
}

async fn not_found() -> BackendError {
    BackendError::handler(StatusCode::NOT_FOUND, "no such endpoint")
}
