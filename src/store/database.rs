//! PostgreSQL adapter
//!
//! Both viewport variants of a route share one `layout_documents` row keyed
//! on `(store_id, route)`, in the `lg_content` and `sm_content` columns.
//! Single-mode writes touch only their own column; a write that creates the
//! row fills the sibling column with an empty section tree.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use super::{empty_document, skeleton_document, LayoutStore, StoreError};
use crate::shared::config::StoreBackend;
use crate::shared::layout::{Mode, StoreKey};

const SELECT_LG: &str =
    "SELECT lg_content AS content FROM layout_documents WHERE store_id = $1 AND route = $2";
const SELECT_SM: &str =
    "SELECT sm_content AS content FROM layout_documents WHERE store_id = $1 AND route = $2";

// $3 is the written document, $4 the sibling default for a new row
const UPSERT_LG: &str = r#"
    INSERT INTO layout_documents (store_id, route, lg_content, sm_content, updated_at)
    VALUES ($1, $2, $3, $4, NOW())
    ON CONFLICT (store_id, route)
    DO UPDATE SET lg_content = EXCLUDED.lg_content, updated_at = NOW()
"#;
const UPSERT_SM: &str = r#"
    INSERT INTO layout_documents (store_id, route, lg_content, sm_content, updated_at)
    VALUES ($1, $2, $4, $3, NOW())
    ON CONFLICT (store_id, route)
    DO UPDATE SET sm_content = EXCLUDED.sm_content, updated_at = NOW()
"#;

const CLEAR_LG: &str = r#"
    UPDATE layout_documents SET lg_content = NULL, updated_at = NOW()
    WHERE store_id = $1 AND route = $2 AND lg_content IS NOT NULL
"#;
const CLEAR_SM: &str = r#"
    UPDATE layout_documents SET sm_content = NULL, updated_at = NOW()
    WHERE store_id = $1 AND route = $2 AND sm_content IS NOT NULL
"#;

const DELETE_EMPTY_ROW: &str = r#"
    DELETE FROM layout_documents
    WHERE store_id = $1 AND route = $2 AND lg_content IS NULL AND sm_content IS NULL
"#;

/// Adapter for the `layout_documents` table
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    pool: PgPool,
}

impl DatabaseStore {
    /// `pool` is the process-wide connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::unavailable(StoreBackend::Database, format!("database error: {}", err))
}

#[async_trait]
impl LayoutStore for DatabaseStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Database
    }

    async fn fetch(&self, key: &StoreKey) -> Result<String, StoreError> {
        let sql = match key.mode {
            Mode::Lg => SELECT_LG,
            Mode::Sm => SELECT_SM,
        };
        let row = sqlx::query(sql)
            .bind(&key.store_id)
            .bind(&key.route)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        let content: Option<Value> = match row {
            Some(row) => row.try_get("content").map_err(db_error)?,
            None => None,
        };
        match content {
            Some(content) => Ok(content.to_string()),
            None => Err(StoreError::not_found(key)),
        }
    }

    async fn store(&self, key: &StoreKey, content: &Value) -> Result<(), StoreError> {
        let sql = match key.mode {
            Mode::Lg => UPSERT_LG,
            Mode::Sm => UPSERT_SM,
        };
        sqlx::query(sql)
            .bind(&key.store_id)
            .bind(&key.route)
            .bind(content.clone())
            .bind(empty_document())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        tracing::debug!("Stored {} in layout_documents", key);
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), StoreError> {
        let sql = match key.mode {
            Mode::Lg => CLEAR_LG,
            Mode::Sm => CLEAR_SM,
        };
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let cleared = sqlx::query(sql)
            .bind(&key.store_id)
            .bind(&key.route)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?
            .rows_affected();
        if cleared == 0 {
            return Err(StoreError::not_found(key));
        }

        sqlx::query(DELETE_EMPTY_ROW)
            .bind(&key.store_id)
            .bind(&key.route)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)
    }

    async fn list_routes(&self, store_id: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT route FROM layout_documents WHERE store_id = $1 ORDER BY route")
            .bind(store_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("route").map_err(db_error))
            .collect()
    }

    /// Both variants are written in one statement
    async fn create_route(&self, store_id: &str, route: &str) -> Result<(), StoreError> {
        let skeleton = skeleton_document(StoreBackend::Database, route)?;
        sqlx::query(
            r#"
            INSERT INTO layout_documents (store_id, route, lg_content, sm_content, updated_at)
            VALUES ($1, $2, $3, $3, NOW())
            ON CONFLICT (store_id, route)
            DO UPDATE SET lg_content = EXCLUDED.lg_content,
                          sm_content = EXCLUDED.sm_content,
                          updated_at = NOW()
            "#,
        )
        .bind(store_id)
        .bind(route)
        .bind(skeleton)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        tracing::debug!("Provisioned {}/{} in layout_documents", store_id, route);
        Ok(())
    }

    async fn delete_route(&self, store_id: &str, route: &str) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM layout_documents WHERE store_id = $1 AND route = $2")
            .bind(store_id)
            .bind(route)
            .execute(&self.pool)
            .await
            .map_err(db_error)?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::not_found(format!("{}/{}", store_id, route)));
        }
        Ok(())
    }
}
