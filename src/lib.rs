//! Storefront Layout - Main Library
//!
//! Persistence and resolution of per-store page layouts. A store's page is a
//! tree of typed sections kept per route and per viewport mode, held in one
//! of several interchangeable backing stores, composed with the shared home
//! header/footer at read time and edited through sparse dotted-path patches.
//!
//! # Module Structure
//!
//! - **`shared`** - Document model, store keys, configuration, shared errors
//!
//! - **`store`** - The `LayoutStore` adapter contract and its implementations
//!   - Disk-service HTTP API
//!   - GitHub repository contents API
//!   - PostgreSQL rows holding both viewport modes
//!   - In-process memory store
//!
//! - **`layout`** - Resolver, deep patch engine and the `LayoutService`
//!   write paths built on top of them
//!
//! - **`translator`** - Free-text instruction to patch translation
//!   (fuzzy exemplar match, fill-mask model, pattern table)
//!
//! - **`backend`** - Axum HTTP server (only compiled with `ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the HTTP server, JWT verification and the
//!   `layout-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use storefront_layout::layout::resolver::resolve;
//! use storefront_layout::shared::layout::{Mode, StoreKey};
//! use storefront_layout::store::MemoryStore;
//!
//! # async fn example() {
//! let store = MemoryStore::new();
//! let key = StoreKey::new("store-1", "about", Mode::Lg);
//! let layout = resolve(&store, &key).await;
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backing store adapters
pub mod store;

/// Layout resolution and patching
pub mod layout;

/// Text instruction translation
pub mod translator;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
