//! Middleware Module
//!
//! HTTP middleware for the layout server.
//!
//! - **`auth`** - Bearer token verification for every `/api` route
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//! use storefront_layout::backend::middleware::auth_middleware;
//!
//! let protected = api.route_layer(from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;

pub use auth::{auth_middleware, bearer_token, AuthStore};
