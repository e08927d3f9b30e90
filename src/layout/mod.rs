//! Layout Resolution and Editing
//!
//! Everything here is written against [`LayoutStore`](crate::store::LayoutStore)
//! and never against a concrete adapter.
//!
//! # Module Structure
//!
//! - **`resolver`** - composes a route's children with the home header/footer
//! - **`patch`** - pure dotted-path sparse patching of JSON documents
//! - **`service`** - write paths: full save, patch, text instruction and
//!   route provisioning
//!
//! # Errors
//!
//! Adapter failures are wrapped with route context on the way out:
//!
//! | Store error | Layout error |
//! |---|---|
//! | `NotFound` on a read | `RouteNotFound` (resolve) / `ContentNotFound` (edit) |
//! | `Unavailable` | `UpstreamUnavailable` |
//! | `Encoding` | `MalformedContent` |

use thiserror::Error;

use crate::shared::config::StoreBackend;
use crate::shared::error::SharedError;
use crate::shared::layout::StoreKey;
use crate::store::StoreError;
use crate::translator::TranslateError;

pub mod patch;
pub mod resolver;
pub mod service;

pub use patch::{apply_patch, Patch, PatchError};
pub use resolver::resolve;
pub use service::{InstructionOutcome, LayoutService, DEFAULT_TEXT_TARGET, NESTED_TEXT_TARGET};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// The requested route has no stored content
    #[error("route '{route}' not found for store '{store_id}'")]
    RouteNotFound { store_id: String, route: String },

    /// An edit targeted a key with no stored content
    #[error("no content stored for {key}; provision the route first")]
    ContentNotFound { key: String },

    /// The backing store failed; safe to retry later
    #[error("{backend} store unavailable: {message}")]
    UpstreamUnavailable {
        backend: StoreBackend,
        message: String,
    },

    /// Stored content does not have the expected shape
    #[error("content for {key} is malformed: {message}")]
    MalformedContent { key: String, message: String },

    #[error("route '{route}' already exists")]
    RouteExists { route: String },

    #[error("route '{route}' cannot be removed")]
    ProtectedRoute { route: String },

    #[error(transparent)]
    PatchConflict(#[from] PatchError),

    #[error(transparent)]
    UnparseableInstruction(#[from] TranslateError),

    #[error(transparent)]
    Invalid(#[from] SharedError),
}

impl LayoutError {
    /// Wrap a read failure of the route being resolved
    pub fn from_route_read(err: StoreError, key: &StoreKey) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::RouteNotFound {
                store_id: key.store_id.clone(),
                route: key.route.clone(),
            },
            other => Self::from_store(other, key),
        }
    }

    /// Wrap a store failure with the key it happened on
    pub fn from_store(err: StoreError, key: &StoreKey) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::ContentNotFound {
                key: key.to_string(),
            },
            StoreError::Unavailable { backend, message } => {
                Self::UpstreamUnavailable { backend, message }
            }
            StoreError::Encoding { message, .. } => Self::MalformedContent {
                key: key.to_string(),
                message,
            },
        }
    }

    /// Stable machine-readable category
    pub fn category(&self) -> &'static str {
        match self {
            Self::RouteNotFound { .. } => "route_not_found",
            Self::ContentNotFound { .. } => "content_not_found",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::MalformedContent { .. } => "malformed_content",
            Self::PatchConflict(_) => "patch_conflict",
            Self::UnparseableInstruction(_) => "unparseable_instruction",
            Self::RouteExists { .. } | Self::ProtectedRoute { .. } | Self::Invalid(_) => {
                "bad_request"
            }
        }
    }
}
