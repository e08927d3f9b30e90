//! Disk-service adapter
//!
//! The disk service stores one opaque JSON file per `{route}{mode}` name
//! under each store. Every request carries the `storeId` and `filename`
//! headers plus a bearer token.
//!
//! | Operation | Request |
//! |---|---|
//! | fetch | `GET {base}/json` |
//! | store | `POST {base}/json` with the document as body |
//! | delete | `DELETE {base}/create-json` |
//! | list | `GET {base}/list-json` -> `{"json_files": [...]}` |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{route_names_from_files, LayoutStore, StoreError};
use crate::shared::config::{DiskServiceConfig, StoreBackend};
use crate::shared::layout::StoreKey;

#[derive(Debug, Deserialize)]
struct FileListing {
    #[serde(default)]
    json_files: Vec<String>,
}

/// Adapter for the remote disk-service HTTP API
#[derive(Debug, Clone)]
pub struct DiskStore {
    client: Client,
    base_url: String,
    token: String,
}

impl DiskStore {
    /// `client` is the process-wide HTTP pool
    pub fn new(client: Client, config: &DiskServiceConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn keyed(&self, request: RequestBuilder, key: &StoreKey) -> RequestBuilder {
        request
            .header("storeId", &key.store_id)
            .header("filename", key.filename())
            .header("Authorization", format!("Bearer {}", self.token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        request
            .send()
            .await
            .map_err(|e| StoreError::unavailable(StoreBackend::Disk, format!("request failed: {}", e)))
    }
}

/// Non-2xx responses other than 404 are upstream failures
async fn unexpected_status(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    StoreError::unavailable(
        StoreBackend::Disk,
        format!("disk service returned {}: {}", status, body.trim()),
    )
}

#[async_trait]
impl LayoutStore for DiskStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Disk
    }

    async fn fetch(&self, key: &StoreKey) -> Result<String, StoreError> {
        let request = self.keyed(self.client.get(self.url("json")), key);
        let response = self.send(request).await?;

        match response.status() {
            status if status.is_success() => response.text().await.map_err(|e| {
                StoreError::unavailable(StoreBackend::Disk, format!("failed to read body: {}", e))
            }),
            StatusCode::NOT_FOUND => Err(StoreError::not_found(key)),
            _ => Err(unexpected_status(response).await),
        }
    }

    async fn store(&self, key: &StoreKey, content: &Value) -> Result<(), StoreError> {
        let request = self.keyed(self.client.post(self.url("json")), key).json(content);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        tracing::debug!("Stored {} on disk service", key);
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), StoreError> {
        let request = self.keyed(self.client.delete(self.url("create-json")), key);
        let response = self.send(request).await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::not_found(key)),
            _ => Err(unexpected_status(response).await),
        }
    }

    async fn list_routes(&self, store_id: &str) -> Result<Vec<String>, StoreError> {
        let request = self
            .client
            .get(self.url("list-json"))
            .header("storeId", store_id)
            .header("Authorization", format!("Bearer {}", self.token));
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        let listing: FileListing = response.json().await.map_err(|e| {
            StoreError::encoding(StoreBackend::Disk, format!("invalid file listing: {}", e))
        })?;
        Ok(route_names_from_files(&listing.json_files))
    }
}
