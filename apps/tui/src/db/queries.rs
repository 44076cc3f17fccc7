use sqlx::{query, query_as, SqlitePool};

use crate::db::models::KvRecord;

/// Retrieves the document stored under `key`, if any
pub async fn get_value(pool: &SqlitePool, key: &str) -> Result<Option<KvRecord>, sqlx::Error> {
    query_as::<_, KvRecord>("SELECT key, value, updated FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Inserts or replaces the document stored under `key`
pub async fn put_value(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO kv_store (key, value, updated) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated = excluded.updated",
    )
    .bind(key)
    .bind(value)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::migrations::setup_database;
    use sqlx::sqlite::SqlitePoolOptions;

    pub async fn setup_test_db() -> Result<SqlitePool, sqlx::Error> {
        // A single connection keeps the in-memory database alive and shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        setup_database(&pool).await?;
        Ok(pool)
    }

    #[tokio::test]
    async fn test_missing_key_is_none() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;
        assert!(get_value(&pool, "rag_history").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_put_value_overwrites() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        put_value(&pool, "rag_history", "[]").await?;
        put_value(&pool, "rag_history", "[1]").await?;

        let stored = get_value(&pool, "rag_history").await?;
        assert_eq!(stored.map(|r| r.value), Some("[1]".to_string()));
        Ok(())
    }
}
