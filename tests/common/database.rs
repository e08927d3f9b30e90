//! Database test fixtures
//!
//! Database suites only run when `DATABASE_URL` points at a disposable
//! PostgreSQL instance; without it they return early.

use sqlx::PgPool;

/// Connect and migrate, or `None` when `DATABASE_URL` is not set
pub async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to create test database pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// A store id no other test run uses
pub fn unique_store_id() -> String {
    format!("test-{}", uuid::Uuid::new_v4())
}
