/**
 * Authentication Middleware
 *
 * Protects the layout API. The middleware reads the `Authorization: Bearer`
 * header, verifies the token against the configured secret and attaches the
 * resulting `StoreSession` to the request extensions. Handlers take the
 * session through the `AuthStore` extractor, so the store id they act on
 * always comes from the token and never from the request body.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::{verify_token, AuthError, StoreSession};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Bearer token from the `Authorization` header, if well formed
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Authentication middleware
///
/// Returns 401 with category `token_expired` for an expired token and
/// `token_invalid` for a missing, malformed or forged one.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).inspect_err(|_| {
        tracing::warn!("Missing or malformed Authorization header");
    })?;

    let session = verify_token(&app_state.jwt_secret, token).map_err(|e| {
        tracing::warn!("Rejected token: {}", e);
        e
    })?;

    tracing::debug!("Authenticated store {} ({})", session.store_id, session.role);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Axum extractor for the verified session
///
/// Only usable behind [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthStore(pub StoreSession);

impl FromRequestParts<AppState> for AuthStore {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<StoreSession>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("StoreSession not found in request extensions");
                BackendError::from(AuthError::MissingToken)
            })?;

        Ok(AuthStore(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use chrono::Duration;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::backend::auth::create_token;
    use crate::layout::LayoutService;
    use crate::shared::config::StoreBackend;
    use crate::store::{MemoryStore, StoreRegistry};
    use crate::translator::{PatternStage, Translator};

    const SECRET: &str = "middleware-secret";

    fn state() -> AppState {
        let stores =
            StoreRegistry::new(StoreBackend::Memory).with_store(Arc::new(MemoryStore::new()));
        let translator = Translator::new(vec![Box::new(PatternStage::new().unwrap())]);
        AppState::new(stores, LayoutService::new(Arc::new(translator)), SECRET)
    }

    async fn whoami(AuthStore(session): AuthStore) -> String {
        session.store_id
    }

    fn app() -> Router {
        let state = state();
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    fn request(auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingToken));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingToken));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Ok("abc.def"));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let token = create_token(SECRET, "store-7", "owner", Duration::hours(1)).unwrap();
        let response = app()
            .oneshot(request(Some(format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"store-7");
    }

    #[tokio::test]
    async fn test_missing_and_expired_tokens_are_rejected() {
        let response = app().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let expired = create_token(SECRET, "store-7", "owner", Duration::hours(-2)).unwrap();
        let response = app()
            .oneshot(request(Some(format!("Bearer {}", expired))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["category"], "token_expired");
    }
}
