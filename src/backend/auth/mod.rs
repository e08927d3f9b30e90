//! Authentication Module
//!
//! Token verification for the layout API. Tokens are issued elsewhere; this
//! module only checks them and exposes the resulting [`StoreSession`].
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! └── sessions.rs     - JWT claims, verification, StoreSession
//! ```
//!
//! # Session Scope
//!
//! Every session is bound to one store id. Handlers build store keys from
//! the session, never from the request, so one tenant cannot read or write
//! another tenant's layouts.

/// JWT token generation and validation
pub mod sessions;

pub use sessions::{create_token, verify_token, AuthError, Claims, StoreSession};
