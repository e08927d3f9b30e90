//! Backend Module
//!
//! The HTTP surface of the layout service: an Axum server exposing layout
//! resolution, full and sparse writes, free-text edits and route management
//! for one store per authenticated session.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - Router assembly
//! - **`layout`** - Layout and route handlers
//! - **`auth`** - JWT session tokens
//! - **`middleware`** - Bearer token verification
//! - **`error`** - `BackendError` and its JSON response form
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Binary entry point
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── layout/         - Layout handlers
//! ├── auth/           - Session tokens
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the store registry, the layout service, the JWT secret
//! and the optional database pool. All of it is created once at startup and
//! shared by cloning; no request-scoped state outlives its request.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_layout::backend::create_app;
//! use storefront_layout::shared::config::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(&config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Layout handlers
pub mod layout;

/// Backend error types
pub mod error;

/// Session tokens
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::{create_app, AppState};
