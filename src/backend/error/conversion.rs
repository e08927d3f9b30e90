/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse`, so handlers return them
 * directly. Error responses are JSON:
 *
 * ```json
 * {
 *   "error": "route 'blog' not found for store 'shop'",
 *   "category": "route_not_found",
 *   "status": 404
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.category();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("{} ({}): {}", status, category, message);
        } else {
            tracing::debug!("{} ({}): {}", status, category, message);
        }

        let body = serde_json::json!({
            "error": message,
            "category": category,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
