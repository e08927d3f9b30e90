//! Layout API
//!
//! HTTP handlers for resolving, saving, patching and instructing layouts,
//! and for managing a store's routes.
//!
//! # Module Structure
//!
//! ```text
//! layout/
//! ├── mod.rs          - Module exports
//! ├── types.rs        - Request/response bodies and the backend selector
//! └── handlers.rs     - Handlers
//! ```

pub mod handlers;
pub mod types;

pub use handlers::{
    create_route, delete_route, get_layout, list_routes, patch_layout, post_instruction,
    put_layout,
};
pub use types::{BackendQuery, CreateRouteRequest, InstructionRequest, RoutesResponse};
