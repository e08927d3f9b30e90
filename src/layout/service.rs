//! Layout write paths
//!
//! [`LayoutService`] ties the adapters, the patch engine and the translator
//! together for everything that changes stored content. The patch paths
//! read, patch and write without any concurrency check, so two concurrent
//! edits of the same key resolve as last-write-wins.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::patch::{apply_patch, scope_patch, Patch};
use super::resolver::parse_home;
use super::LayoutError;
use crate::shared::error::SharedError;
use crate::shared::layout::{
    json_kind, validate_route_name, Layout, Mode, RouteContent, StoreKey, HOME_ROUTE,
};
use crate::store::{LayoutStore, StoreError};
use crate::translator::Translator;

/// Where text instructions land when no target is given
pub const DEFAULT_TEXT_TARGET: &str = "children.sections.0.setting";

/// Default target for documents in the nested `{sections:{children, ...}}`
/// shape (home and the working layout)
pub const NESTED_TEXT_TARGET: &str = "sections.children.sections.0.setting";

/// Pseudo-route the editor saves its current working layout under
pub const WORKING_LAYOUT_ROUTE: &str = "null";

/// Result of a text instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionOutcome {
    /// Patch produced by the translator, before scoping to the target
    pub patch: Patch,
    /// Document as stored after the patch
    pub document: Value,
}

#[derive(Clone)]
pub struct LayoutService {
    translator: Arc<Translator>,
}

impl LayoutService {
    pub fn new(translator: Arc<Translator>) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Resolve the render-ready layout for `key`
    pub async fn resolve(&self, store: &dyn LayoutStore, key: &StoreKey) -> Result<Layout, LayoutError> {
        super::resolver::resolve(store, key).await
    }

    /// Replace the whole document stored under `key`
    pub async fn save(
        &self,
        store: &dyn LayoutStore,
        key: &StoreKey,
        content: &Value,
    ) -> Result<(), LayoutError> {
        key.validate()?;
        check_document(key, content)?;
        store
            .store(key, content)
            .await
            .map_err(|e| LayoutError::from_store(e, key))?;
        tracing::info!("Saved {} via {}", key, store.backend());
        Ok(())
    }

    /// Apply a sparse patch to the stored document and write it back
    pub async fn patch(
        &self,
        store: &dyn LayoutStore,
        key: &StoreKey,
        patch: &Patch,
    ) -> Result<Value, LayoutError> {
        key.validate()?;
        let current = fetch_document(store, key).await?;
        self.write_patched(store, key, &current, patch).await
    }

    /// Translate a free-text instruction and apply it under `target`.
    ///
    /// Without a target the edit lands in the first section's settings:
    /// [`DEFAULT_TEXT_TARGET`] for route documents and
    /// [`NESTED_TEXT_TARGET`] for documents in the nested home shape.
    pub async fn apply_instruction(
        &self,
        store: &dyn LayoutStore,
        key: &StoreKey,
        text: &str,
        target: Option<&str>,
    ) -> Result<InstructionOutcome, LayoutError> {
        key.validate()?;
        let translated = self.translator.translate(text).await?;
        let current = fetch_document(store, key).await?;

        let target = target.unwrap_or_else(|| default_text_target(&current));
        let scoped = scope_patch(target, translated.clone());
        let document = self.write_patched(store, key, &current, &scoped).await?;
        Ok(InstructionOutcome {
            patch: translated,
            document,
        })
    }

    async fn write_patched(
        &self,
        store: &dyn LayoutStore,
        key: &StoreKey,
        current: &Value,
        patch: &Patch,
    ) -> Result<Value, LayoutError> {
        let patched = apply_patch(current, patch)?;
        check_document(key, &patched)?;
        store
            .store(key, &patched)
            .await
            .map_err(|e| LayoutError::from_store(e, key))?;

        tracing::info!("Patched {} ({} path(s)) via {}", key, patch.len(), store.backend());
        Ok(patched)
    }

    /// Routes provisioned for a store
    pub async fn list_routes(
        &self,
        store: &dyn LayoutStore,
        store_id: &str,
    ) -> Result<Vec<String>, LayoutError> {
        store
            .list_routes(store_id)
            .await
            .map_err(|e| route_error(e, store_id, ""))
    }

    /// Provision both modes of a new route with an empty skeleton
    pub async fn create_route(
        &self,
        store: &dyn LayoutStore,
        store_id: &str,
        route: &str,
    ) -> Result<(), LayoutError> {
        validate_route_name(route)?;
        let existing = self.list_routes(store, store_id).await?;
        if existing.iter().any(|r| r == route) {
            return Err(LayoutError::RouteExists {
                route: route.to_string(),
            });
        }

        store
            .create_route(store_id, route)
            .await
            .map_err(|e| route_error(e, store_id, route))?;
        tracing::info!("Provisioned route {}/{} via {}", store_id, route, store.backend());
        Ok(())
    }

    /// Remove both modes of a route
    pub async fn delete_route(
        &self,
        store: &dyn LayoutStore,
        store_id: &str,
        route: &str,
    ) -> Result<(), LayoutError> {
        validate_route_name(route)?;
        if route == HOME_ROUTE {
            return Err(LayoutError::ProtectedRoute {
                route: route.to_string(),
            });
        }

        store
            .delete_route(store_id, route)
            .await
            .map_err(|e| route_error(e, store_id, route))?;
        tracing::info!("Removed route {}/{} via {}", store_id, route, store.backend());
        Ok(())
    }
}

async fn fetch_document(store: &dyn LayoutStore, key: &StoreKey) -> Result<Value, LayoutError> {
    let raw = store
        .fetch(key)
        .await
        .map_err(|e| LayoutError::from_store(e, key))?;
    serde_json::from_str(&raw).map_err(|e| LayoutError::MalformedContent {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn default_text_target(document: &Value) -> &'static str {
    match document.get("sections") {
        Some(Value::Object(_)) => NESTED_TEXT_TARGET,
        _ => DEFAULT_TEXT_TARGET,
    }
}

fn route_error(err: StoreError, store_id: &str, route: &str) -> LayoutError {
    LayoutError::from_route_read(err, &StoreKey::new(store_id, route, Mode::Lg))
}

/// Home and the working-layout pseudo-route hold composed documents; every
/// other route must hold a section tree.
fn check_document(key: &StoreKey, content: &Value) -> Result<(), LayoutError> {
    if !content.is_object() {
        return Err(SharedError::validation(
            "content",
            format!("layout content must be an object, found {}", json_kind(content)),
        )
        .into());
    }

    if key.is_home() {
        parse_home(&content.to_string(), key).map_err(|e| {
            SharedError::validation("content", format!("invalid home document: {}", e))
        })?;
    } else if key.route != WORKING_LAYOUT_ROUTE {
        serde_json::from_value::<RouteContent>(content.clone()).map_err(|e| {
            SharedError::validation("content", format!("invalid route document: {}", e))
        })?;
    }
    Ok(())
}
