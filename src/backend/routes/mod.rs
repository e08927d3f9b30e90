//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, health and fallback
//! └── api_routes.rs   - Layout and route-management endpoints
//! ```
//!
//! # Routes
//!
//! - `GET /health` - public
//! - `/api/layout/...` and `/api/routes/...` - require a Bearer token

/// Main router creation
pub mod router;

/// API endpoint registration
pub mod api_routes;

pub use router::create_router;
