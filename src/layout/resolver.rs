//! Layout Resolver
//!
//! A page is always composed at read time from two documents of the same
//! store and mode: the requested route supplies `children`, the home
//! document supplies `sectionHeader` and `sectionFooter`. Both are fetched
//! concurrently and the first failure short-circuits, so a partially
//! composed layout is never returned.

use futures_util::future::try_join;
use serde_json::Value;

use super::LayoutError;
use crate::shared::layout::{HomeContent, Layout, StoreKey};
use crate::store::LayoutStore;

/// Resolve the render-ready layout for `key`
pub async fn resolve(store: &dyn LayoutStore, key: &StoreKey) -> Result<Layout, LayoutError> {
    key.validate()?;

    if key.is_home() {
        let raw = store
            .fetch(key)
            .await
            .map_err(|e| LayoutError::from_route_read(e, key))?;
        return Ok(Layout::from_home(parse_home(&raw, key)?));
    }

    let home_key = key.home();
    let route_read = async {
        store
            .fetch(key)
            .await
            .map_err(|e| LayoutError::from_route_read(e, key))
    };
    let home_read = async {
        store
            .fetch(&home_key)
            .await
            .map_err(|e| LayoutError::from_route_read(e, &home_key))
    };
    let (route_raw, home_raw) = try_join(route_read, home_read).await?;

    let children = route_children(&route_raw, key)?;
    let home = parse_home(&home_raw, &home_key)?;

    tracing::debug!("Resolved layout for {}", key);
    Ok(Layout::compose(home, children))
}

pub(crate) fn parse_home(raw: &str, key: &StoreKey) -> Result<HomeContent, LayoutError> {
    serde_json::from_str(raw).map_err(|e| LayoutError::MalformedContent {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// The `children` object of a stored route document
fn route_children(raw: &str, key: &StoreKey) -> Result<Value, LayoutError> {
    let malformed = |message: String| LayoutError::MalformedContent {
        key: key.to_string(),
        message,
    };

    let mut document: Value = serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
    match document.get_mut("children").map(Value::take) {
        Some(children @ Value::Object(_)) => Ok(children),
        Some(other) => Err(malformed(format!(
            "`children` must be an object, found {}",
            crate::shared::layout::json_kind(&other)
        ))),
        None => Err(malformed("document has no `children`".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::StoreBackend;
    use crate::shared::layout::Mode;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .store(
                &StoreKey::new("storeX", "home", Mode::Lg),
                &json!({
                    "type": "layout",
                    "sections": {
                        "sectionHeader": {"type": "header", "setting": {"logo": "/l.png"}},
                        "children": {"type": "home", "sections": [], "order": []},
                        "sectionFooter": {"type": "footer"}
                    }
                }),
            )
            .await
            .unwrap();
        store
            .store(
                &StoreKey::new("storeX", "about", Mode::Lg),
                &json!({"children": {
                    "sections": [{"type": "Banner", "blocks": {}, "setting": {}}],
                    "order": ["Banner-u1"]
                }}),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_resolve_route_substitutes_children() {
        let store = seeded().await;
        let layout = resolve(&store, &StoreKey::new("storeX", "about", Mode::Lg))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&layout).unwrap(),
            json!({"sections": {
                "sectionHeader": {"type": "header", "setting": {"logo": "/l.png"}},
                "children": {
                    "sections": [{"type": "Banner", "blocks": {}, "setting": {}}],
                    "order": ["Banner-u1"]
                },
                "sectionFooter": {"type": "footer"}
            }})
        );
    }

    #[tokio::test]
    async fn test_resolve_home_uses_home_document_only() {
        let store = seeded().await;
        let layout = resolve(&store, &StoreKey::new("storeX", "home", Mode::Lg))
            .await
            .unwrap();
        assert_eq!(layout.sections.children["type"], "home");
        assert_eq!(layout.sections.section_footer, json!({"type": "footer"}));
    }

    #[tokio::test]
    async fn test_missing_route_is_route_not_found() {
        let store = seeded().await;
        let err = resolve(&store, &StoreKey::new("storeX", "blog", Mode::Lg))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::RouteNotFound {
                store_id: "storeX".into(),
                route: "blog".into()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_home_is_reported_for_home() {
        let store = seeded().await;
        // sm has no home document
        store
            .store(
                &StoreKey::new("storeX", "about", Mode::Sm),
                &json!({"children": {"sections": [], "order": []}}),
            )
            .await
            .unwrap();
        let err = resolve(&store, &StoreKey::new("storeX", "about", Mode::Sm))
            .await
            .unwrap_err();
        assert!(matches!(err, LayoutError::RouteNotFound { ref route, .. } if route == "home"));
    }

    #[tokio::test]
    async fn test_unavailable_store_is_upstream_unavailable() {
        let store = seeded().await;
        store.set_unavailable(true);
        let err = resolve(&store, &StoreKey::new("storeX", "about", Mode::Lg))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LayoutError::UpstreamUnavailable { backend: StoreBackend::Memory, .. }
        ));
    }

    #[tokio::test]
    async fn test_route_without_children_is_malformed() {
        let store = seeded().await;
        store
            .insert_raw(StoreKey::new("storeX", "broken", Mode::Lg), r#"{"sections": []}"#)
            .await;
        let err = resolve(&store, &StoreKey::new("storeX", "broken", Mode::Lg))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "malformed_content");
    }
}
