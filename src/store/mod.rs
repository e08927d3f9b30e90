//! Layout Storage Adapters
//!
//! Every backing store implements [`LayoutStore`], so the resolver and the
//! write paths are written once against the trait and the concrete adapter is
//! picked at runtime through [`StoreRegistry`].
//!
//! # Adapters
//!
//! - **`disk`** - remote disk-service HTTP API, addressed by `{route}{mode}`
//! - **`github`** - one repository per store, files under `public/template/`
//! - **`database`** - one PostgreSQL row per `(store, route)` holding both modes
//! - **`memory`** - in-process map for tests and local development
//!
//! # Contract
//!
//! - `fetch` returns the raw stored text; callers parse it
//! - `store` is an idempotent upsert that replaces the whole document or
//!   changes nothing
//! - a missing document is [`StoreError::NotFound`]; transport, auth and
//!   unexpected upstream statuses are [`StoreError::Unavailable`]
//! - nothing is retried

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::shared::config::StoreBackend;
use crate::shared::layout::{Mode, RouteContent, StoreKey};

/// Remote disk-service adapter
pub mod disk;

/// GitHub repository adapter
pub mod github;

/// PostgreSQL adapter
pub mod database;

/// In-process adapter
pub mod memory;

pub use database::DatabaseStore;
pub use disk::DiskStore;
pub use github::GitHubStore;
pub use memory::MemoryStore;

/// Storage adapter failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Nothing is stored under the key
    #[error("no content stored for {key}")]
    NotFound { key: String },

    /// Transport, auth or upstream failure; safe to retry later
    #[error("{backend} store unavailable: {message}")]
    Unavailable {
        backend: StoreBackend,
        message: String,
    },

    /// Stored bytes could not be decoded, or content could not be encoded
    #[error("{backend} store content could not be decoded: {message}")]
    Encoding {
        backend: StoreBackend,
        message: String,
    },
}

impl StoreError {
    pub fn not_found(key: impl ToString) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    pub fn unavailable(backend: StoreBackend, message: impl Into<String>) -> Self {
        Self::Unavailable {
            backend,
            message: message.into(),
        }
    }

    pub fn encoding(backend: StoreBackend, message: impl Into<String>) -> Self {
        Self::Encoding {
            backend,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Capability set shared by every storage backend
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Which backend this adapter talks to
    fn backend(&self) -> StoreBackend;

    /// Raw content stored under `key`
    async fn fetch(&self, key: &StoreKey) -> Result<String, StoreError>;

    /// Create or replace the content stored under `key`
    async fn store(&self, key: &StoreKey, content: &Value) -> Result<(), StoreError>;

    /// Remove the content stored under `key`
    async fn delete(&self, key: &StoreKey) -> Result<(), StoreError>;

    /// Distinct route names provisioned for a store
    async fn list_routes(&self, store_id: &str) -> Result<Vec<String>, StoreError>;

    /// Write the empty skeleton for both modes of `route`.
    ///
    /// Adapters that cannot write both variants at once write `lg` first and
    /// remove it again if the `sm` write fails.
    async fn create_route(&self, store_id: &str, route: &str) -> Result<(), StoreError> {
        let skeleton = skeleton_document(self.backend(), route)?;
        let lg = StoreKey::new(store_id, route, Mode::Lg);
        let sm = StoreKey::new(store_id, route, Mode::Sm);

        self.store(&lg, &skeleton).await?;
        if let Err(err) = self.store(&sm, &skeleton).await {
            tracing::warn!("Provisioning {} failed, removing {}: {}", sm, lg, err);
            if let Err(cleanup) = self.delete(&lg).await {
                tracing::error!("Failed to remove half-provisioned {}: {}", lg, cleanup);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Remove both modes of `route`. Fails with `NotFound` only when neither
    /// variant existed.
    ///
    /// Adapters that cannot remove both variants at once delete `lg` first
    /// and write it back if the `sm` delete fails.
    async fn delete_route(&self, store_id: &str, route: &str) -> Result<(), StoreError> {
        let lg = StoreKey::new(store_id, route, Mode::Lg);
        let sm = StoreKey::new(store_id, route, Mode::Sm);

        let snapshot = match self.fetch(&lg).await {
            Ok(raw) => Some(raw),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err),
        };

        let mut removed = 0;
        if snapshot.is_some() {
            match self.delete(&lg).await {
                Ok(()) => removed += 1,
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }

        match self.delete(&sm).await {
            Ok(()) => removed += 1,
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                if let Some(raw) = snapshot.filter(|_| removed > 0) {
                    tracing::warn!("Removing {} failed, restoring {}: {}", sm, lg, err);
                    restore(self, &lg, &raw).await;
                }
                return Err(err);
            }
        }

        if removed == 0 {
            return Err(StoreError::not_found(format!("{}/{}", store_id, route)));
        }
        Ok(())
    }
}

async fn restore<S: LayoutStore + ?Sized>(store: &S, key: &StoreKey, raw: &str) {
    let content: Value = match serde_json::from_str(raw) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Cannot restore {}, stored text is not JSON: {}", key, e);
            return;
        }
    };
    if let Err(e) = store.store(key, &content).await {
        tracing::error!("Failed to restore half-removed {}: {}", key, e);
    }
}

/// Skeleton document written when a route is provisioned
pub(crate) fn skeleton_document(backend: StoreBackend, route: &str) -> Result<Value, StoreError> {
    serde_json::to_value(RouteContent::skeleton(route))
        .map_err(|e| StoreError::encoding(backend, e.to_string()))
}

/// Content the database adapter writes for the sibling mode of a new row
pub(crate) fn empty_document() -> Value {
    serde_json::json!({ "children": { "sections": [], "order": [] } })
}

/// Reduce template file names (`aboutlg.json`, `aboutSm.json`, ...) to the
/// distinct route names they belong to, in first-seen order.
pub(crate) fn route_names_from_files<I, S>(files: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut routes: Vec<String> = Vec::new();
    for file in files {
        let name = file.as_ref();
        let name = name.strip_suffix(".json").unwrap_or(name);
        let route = ["lg", "sm", "Lg", "Sm"]
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix))
            .unwrap_or(name);
        if !route.is_empty() && !routes.iter().any(|r| r == route) {
            routes.push(route.to_string());
        }
    }
    routes
}

/// Configured adapters, keyed by backend selector
#[derive(Clone)]
pub struct StoreRegistry {
    stores: HashMap<StoreBackend, Arc<dyn LayoutStore>>,
    default_backend: StoreBackend,
}

impl StoreRegistry {
    pub fn new(default_backend: StoreBackend) -> Self {
        Self {
            stores: HashMap::new(),
            default_backend,
        }
    }

    /// Register an adapter under its own backend selector
    pub fn with_store(mut self, store: Arc<dyn LayoutStore>) -> Self {
        self.stores.insert(store.backend(), store);
        self
    }

    pub fn default_backend(&self) -> StoreBackend {
        self.default_backend
    }

    /// Configured backends, in a stable order
    pub fn backends(&self) -> Vec<StoreBackend> {
        let mut backends: Vec<StoreBackend> = self.stores.keys().copied().collect();
        backends.sort_by_key(|b| b.as_str());
        backends
    }

    /// Adapter for `requested`, or for the default backend when `None`
    pub fn select(&self, requested: Option<StoreBackend>) -> Option<Arc<dyn LayoutStore>> {
        let backend = requested.unwrap_or(self.default_backend);
        self.stores.get(&backend).cloned()
    }
}
