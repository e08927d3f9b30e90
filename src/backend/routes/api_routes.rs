/**
 * API Route Configuration
 *
 * Registers the layout and route-management endpoints. All of them sit
 * behind the auth middleware, which `router::create_router` applies to the
 * router returned here.
 *
 * # Routes
 *
 * ## Layouts
 * - `GET|PUT|PATCH /api/layout/{route}/{mode}`
 * - `POST /api/layout/{route}/{mode}/instruction`
 *
 * ## Routes
 * - `GET|POST /api/routes`
 * - `DELETE /api/routes/{route}`
 */

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::backend::layout::{
    create_route, delete_route, get_layout, list_routes, patch_layout, post_instruction,
    put_layout,
};
use crate::backend::server::state::AppState;

/// Add the layout API routes to `router`
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/layout/{route}/{mode}",
            get(get_layout).put(put_layout).patch(patch_layout),
        )
        .route(
            "/api/layout/{route}/{mode}/instruction",
            post(post_instruction),
        )
        .route("/api/routes", get(list_routes).post(create_route))
        .route("/api/routes/{route}", delete(delete_route))
}
