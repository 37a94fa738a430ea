//! Local store schema management.
//!
//! Ensures the key-value table exists before the store is used. Applied once
//! when a [`HealthStorage`](super::HealthStorage) is opened.

use sqlx::SqlitePool;

use crate::Result;

// ---

/// Create the key-value table (idempotent).
///
/// Each entry holds one JSON document under a fixed key; there is no schema
/// versioning or migration. Safe to call on every open.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key         TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
