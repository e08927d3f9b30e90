//! In-process adapter for tests and local development
//!
//! Content is kept as serialized text so a fetch returns exactly what the
//! other adapters would: an opaque string the caller parses. Failure
//! injection lets callers exercise the `Unavailable` paths without a network.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{LayoutStore, StoreError};
use crate::shared::config::StoreBackend;
use crate::shared::layout::{Mode, StoreKey};

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<StoreKey, String>>,
    unavailable: AtomicBool,
    fail_lg_writes: AtomicBool,
    fail_sm_writes: AtomicBool,
    fail_lg_deletes: AtomicBool,
    fail_sm_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `Unavailable` until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make writes for one mode fail with `Unavailable`
    pub fn fail_writes_for(&self, mode: Mode) {
        match mode {
            Mode::Lg => self.fail_lg_writes.store(true, Ordering::SeqCst),
            Mode::Sm => self.fail_sm_writes.store(true, Ordering::SeqCst),
        }
    }

    /// Make deletes for one mode fail with `Unavailable`
    pub fn fail_deletes_for(&self, mode: Mode) {
        match mode {
            Mode::Lg => self.fail_lg_deletes.store(true, Ordering::SeqCst),
            Mode::Sm => self.fail_sm_deletes.store(true, Ordering::SeqCst),
        }
    }

    /// Insert raw text, bypassing JSON encoding
    pub async fn insert_raw(&self, key: StoreKey, text: impl Into<String>) {
        self.documents.write().await.insert(key, text.into());
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(StoreBackend::Memory, "store marked unavailable"));
        }
        Ok(())
    }

    fn check_writable(&self, mode: Mode) -> Result<(), StoreError> {
        let failing = match mode {
            Mode::Lg => &self.fail_lg_writes,
            Mode::Sm => &self.fail_sm_writes,
        };
        self.check_flag(failing, "writes", mode)
    }

    fn check_deletable(&self, mode: Mode) -> Result<(), StoreError> {
        let failing = match mode {
            Mode::Lg => &self.fail_lg_deletes,
            Mode::Sm => &self.fail_sm_deletes,
        };
        self.check_flag(failing, "deletes", mode)
    }

    fn check_flag(&self, flag: &AtomicBool, operation: &str, mode: Mode) -> Result<(), StoreError> {
        self.check_available()?;
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(
                StoreBackend::Memory,
                format!("{} for mode {} are failing", operation, mode),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LayoutStore for MemoryStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn fetch(&self, key: &StoreKey) -> Result<String, StoreError> {
        self.check_available()?;
        self.documents
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key))
    }

    async fn store(&self, key: &StoreKey, content: &Value) -> Result<(), StoreError> {
        self.check_writable(key.mode)?;
        let text = serde_json::to_string(content)
            .map_err(|e| StoreError::encoding(StoreBackend::Memory, e.to_string()))?;
        self.documents.write().await.insert(key.clone(), text);
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), StoreError> {
        self.check_deletable(key.mode)?;
        match self.documents.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(key)),
        }
    }

    async fn list_routes(&self, store_id: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let documents = self.documents.read().await;
        let mut routes: Vec<String> = documents
            .keys()
            .filter(|key| key.store_id == store_id)
            .map(|key| key.route.clone())
            .collect();
        routes.sort();
        routes.dedup();
        Ok(routes)
    }
}
