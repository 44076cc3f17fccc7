use color_eyre::Result;
use sqlx::{migrate::MigrateDatabase, query, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};

/// Sets up the database by creating the necessary tables if they don't exist
pub async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Keyed JSON documents, one row per persisted collection
    query(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Opens (creating if needed) the SQLite database behind `database_url` and
/// makes sure the schema exists.
pub async fn create_database_pool(database_url: &str) -> Result<SqlitePool> {
    tracing::info!(database_url, "initializing database");

    let db_exists = Sqlite::database_exists(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Error checking database: {e}"))?;

    if !db_exists {
        tracing::info!("database does not exist, creating it now");
        Sqlite::create_database(database_url)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create SQLite database: {e}"))?;
    }

    // Writes come from a single task, one connection is enough.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .after_connect(|conn, _| {
            Box::pin(async move {
                use sqlx::Executor as _;
                conn.execute("PRAGMA journal_mode = WAL;").await?;
                conn.execute("PRAGMA synchronous = NORMAL;").await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect to SQLite database: {e}"))?;

    setup_database(&pool)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to set up database schema: {e}"))?;

    Ok(pool)
}
