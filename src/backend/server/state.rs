/**
 * Application State Management
 *
 * `AppState` is the central state container shared by every handler:
 * - the store registry (one adapter per configured backend)
 * - the layout service (write paths and translator)
 * - the JWT secret used by the auth middleware
 *
 * Everything in it is created once at startup and is cheap to clone. The
 * database pool, when configured, lives inside its adapter in the registry.
 */

use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::layout::LayoutService;
use crate::shared::config::StoreBackend;
use crate::store::{LayoutStore, StoreRegistry};

#[derive(Clone)]
pub struct AppState {
    /// Adapters keyed by backend selector
    pub stores: StoreRegistry,
    /// Layout write paths
    pub layouts: LayoutService,
    /// HS256 secret for session tokens
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        stores: StoreRegistry,
        layouts: LayoutService,
        jwt_secret: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            stores,
            layouts,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Adapter for the requested backend, or the default one
    pub fn store_for(&self, backend: Option<StoreBackend>) -> Result<Arc<dyn LayoutStore>, BackendError> {
        self.stores.select(backend).ok_or_else(|| {
            let backend = backend.unwrap_or(self.stores.default_backend());
            BackendError::bad_request(format!("backend '{}' is not configured", backend))
        })
    }
}
