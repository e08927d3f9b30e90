//! Server Module
//!
//! Everything needed to turn an [`AppConfig`](crate::shared::config::AppConfig)
//! into a running Axum application.
//!
//! # Architecture
//!
//! - **`state`** - `AppState`, shared by every handler
//! - **`config`** - Configuration and database loading
//! - **`init`** - Adapter registration and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and backend selection
//! ├── config.rs       - Configuration loading (env, TOML, database)
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `LAYOUT_CONFIG` file plus environment
//! 2. **Resources**: one HTTP client and an optional Postgres pool
//! 3. **Adapters**: one per configured backend, in a `StoreRegistry`
//! 4. **Router Creation**: layout routes behind the auth middleware

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{build_state, create_app, InitError};
pub use state::AppState;
