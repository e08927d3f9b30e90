//! GitHub repository adapter
//!
//! Each store owns a repository named after its store id under the
//! configured owner. Route documents live at
//! `public/template/{route}{mode}.json` and go through the contents API:
//!
//! - reads decode the base64 `content` field of the file metadata
//! - writes and deletes must carry the file's current blob `sha`; the API
//!   rejects a stale or missing sha for an existing file (409/422) and that
//!   rejection is reported as [`StoreError::Unavailable`]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{route_names_from_files, LayoutStore, StoreError};
use crate::shared::config::{GitHubConfig, StoreBackend};
use crate::shared::layout::StoreKey;

const TEMPLATE_DIR: &str = "public/template";
const USER_AGENT: &str = "storefront-layout";

#[derive(Debug, Deserialize)]
struct ContentsFile {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteContents<'a> {
    message: String,
    sha: &'a str,
}

/// Adapter for repository-as-filesystem storage
#[derive(Debug, Clone)]
pub struct GitHubStore {
    client: Client,
    api_url: String,
    owner: String,
    token: String,
}

impl GitHubStore {
    /// `client` is the process-wide HTTP pool
    pub fn new(client: Client, config: &GitHubConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            token: config.token.clone(),
        }
    }

    /// Repository path of a route document
    pub fn template_path(key: &StoreKey) -> String {
        format!("{}/{}.json", TEMPLATE_DIR, key.filename())
    }

    fn contents_url(&self, store_id: &str, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, self.owner, store_id, path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::unavailable(StoreBackend::GitHub, format!("request failed: {}", e)))
    }

    /// File metadata, or `None` when the file does not exist
    async fn contents(&self, url: &str) -> Result<Option<ContentsFile>, StoreError> {
        let response = self.send(self.client.get(url)).await?;
        match response.status() {
            status if status.is_success() => {
                let file = response.json::<ContentsFile>().await.map_err(|e| {
                    StoreError::encoding(StoreBackend::GitHub, format!("invalid contents response: {}", e))
                })?;
                Ok(Some(file))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected_status(response).await),
        }
    }
}

async fn unexpected_status(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match status {
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            format!("write rejected, file sha is stale ({}): {}", status, body.trim())
        }
        _ => format!("GitHub API returned {}: {}", status, body.trim()),
    };
    StoreError::unavailable(StoreBackend::GitHub, message)
}

/// Decode the base64 payload of a contents response. GitHub wraps the
/// encoded text at 60 columns.
fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::encoding(StoreBackend::GitHub, format!("invalid base64 content: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| StoreError::encoding(StoreBackend::GitHub, format!("content is not UTF-8: {}", e)))
}

#[async_trait]
impl LayoutStore for GitHubStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::GitHub
    }

    async fn fetch(&self, key: &StoreKey) -> Result<String, StoreError> {
        let url = self.contents_url(&key.store_id, &Self::template_path(key));
        match self.contents(&url).await? {
            Some(file) => decode_content(&file.content),
            None => Err(StoreError::not_found(key)),
        }
    }

    async fn store(&self, key: &StoreKey, content: &Value) -> Result<(), StoreError> {
        let path = Self::template_path(key);
        let url = self.contents_url(&key.store_id, &path);

        let current = self.contents(&url).await?;
        let text = serde_json::to_string_pretty(content)
            .map_err(|e| StoreError::encoding(StoreBackend::GitHub, e.to_string()))?;

        let body = PutContents {
            message: format!("Update {}", path),
            content: STANDARD.encode(text),
            sha: current.as_ref().map(|file| file.sha.as_str()),
        };
        let response = self.send(self.client.put(&url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        tracing::debug!(
            "Stored {} in {}/{} ({})",
            key,
            self.owner,
            key.store_id,
            if current.is_some() { "updated" } else { "created" }
        );
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), StoreError> {
        let path = Self::template_path(key);
        let url = self.contents_url(&key.store_id, &path);

        let Some(current) = self.contents(&url).await? else {
            return Err(StoreError::not_found(key));
        };
        let body = DeleteContents {
            message: format!("Delete {}", path),
            sha: &current.sha,
        };
        let response = self.send(self.client.delete(&url).json(&body)).await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::not_found(key)),
            _ => Err(unexpected_status(response).await),
        }
    }

    async fn list_routes(&self, store_id: &str) -> Result<Vec<String>, StoreError> {
        let url = self.contents_url(store_id, TEMPLATE_DIR);
        let response = self.send(self.client.get(&url)).await?;

        match response.status() {
            status if status.is_success() => {
                let entries: Vec<DirectoryEntry> = response.json().await.map_err(|e| {
                    StoreError::encoding(StoreBackend::GitHub, format!("invalid directory listing: {}", e))
                })?;
                let files = entries
                    .iter()
                    .filter(|entry| entry.entry_type == "file" && entry.name.ends_with(".json"))
                    .map(|entry| entry.name.as_str());
                Ok(route_names_from_files(files))
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            _ => Err(unexpected_status(response).await),
        }
    }
}
