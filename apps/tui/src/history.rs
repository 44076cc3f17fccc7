//! Bounded, persisted list of the most recent analysis submissions.
//!
//! The store holds at most [`HISTORY_CAPACITY`] entries, newest first. It is
//! written only from the UI task in response to user actions, so it carries
//! no locking.

use crate::db;
use crate::domain::HistoryEntry;
use serde_json::Value;
use sqlx::SqlitePool;

/// Storage key of the JSON-encoded entry array.
pub const HISTORY_KEY: &str = "rag_history";
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to persist history: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    pool: Option<SqlitePool>,
}

impl HistoryStore {
    /// A store that is never written to disk.
    pub const fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            pool: None,
        }
    }

    /// Reads persisted entries. Absent, unreadable or corrupted storage
    /// yields an empty store; this never fails.
    pub async fn load(pool: Option<SqlitePool>) -> Self {
        let Some(pool) = pool else {
            tracing::info!("no history database, keeping history in memory only");
            return Self::in_memory();
        };

        let entries = match db::get_value(&pool, HISTORY_KEY).await {
            Ok(Some(record)) => decode_entries(&record.value),
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "could not read persisted history");
                Vec::new()
            }
        };

        tracing::info!(entries = entries.len(), "history loaded");
        Self {
            entries,
            pool: Some(pool),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }

    /// Prepends `entry`, truncates to capacity and persists the result before
    /// returning. The in-memory list is updated even if persisting fails.
    ///
    /// Ids stay unique: an entry whose id is already taken is renumbered past
    /// the largest stored id.
    pub async fn append(&mut self, mut entry: HistoryEntry) -> Result<(), HistoryError> {
        if self.entries.iter().any(|existing| existing.id == entry.id) {
            let largest = self.entries.iter().map(|existing| existing.id).max();
            entry.id = largest.map_or(entry.id, |largest| entry.id.max(largest + 1));
        }
        push_bounded(&mut self.entries, entry, HISTORY_CAPACITY);

        if let Some(pool) = &self.pool {
            let encoded = serde_json::to_string(&self.entries)?;
            db::put_value(pool, HISTORY_KEY, &encoded).await?;
        }

        Ok(())
    }
}

/// Inserts at the front and drops whatever falls past `capacity`.
pub fn push_bounded<T>(items: &mut Vec<T>, item: T, capacity: usize) {
    items.insert(0, item);
    items.truncate(capacity);
}

/// Decodes a stored document. A document that is not a JSON array is treated
/// as empty; individual malformed entries are skipped.
fn decode_entries(raw: &str) -> Vec<HistoryEntry> {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            tracing::warn!("persisted history is not a list, ignoring it");
            return Vec::new();
        }
        Err(error) => {
            tracing::warn!(%error, "persisted history is corrupted, ignoring it");
            return Vec::new();
        }
    };

    let mut entries: Vec<HistoryEntry> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!(%error, "skipping malformed history entry");
                None
            }
        })
        .collect();
    entries.truncate(HISTORY_CAPACITY);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::tests::setup_test_db;
    use crate::domain::AnalysisResult;

    fn entry(id: i64) -> HistoryEntry {
        HistoryEntry {
            id,
            question: format!("complaint {id}"),
            result: AnalysisResult {
                category: Some("pothole".to_string()),
                urgency: Some("High".to_string()),
                recommended_action: None,
                retrieved: Vec::new(),
                image_detections: Vec::new(),
                annotated_image: None,
                location: None,
                area: None,
            },
            timestamp: format!("2025-11-17T10:{:02}:00Z", id % 60),
        }
    }

    #[test]
    fn push_bounded_keeps_newest_first() {
        let mut items = vec![2, 1];
        push_bounded(&mut items, 3, 2);
        assert_eq!(items, vec![3, 2]);
    }

    #[tokio::test]
    async fn eleven_appends_keep_ten_newest() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;
        let mut store = HistoryStore::load(Some(pool.clone())).await;

        for id in 1..=11 {
            store.append(entry(id)).await?;
        }

        let ids: Vec<i64> = store.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, (2..=11).rev().collect::<Vec<_>>());

        let reloaded = HistoryStore::load(Some(pool)).await;
        assert_eq!(reloaded.len(), HISTORY_CAPACITY);
        assert_eq!(reloaded.entries()[0].id, 11);
        assert!(reloaded.entries().iter().all(|e| e.id != 1));
        Ok(())
    }

    #[tokio::test]
    async fn colliding_ids_are_renumbered() -> Result<(), Box<dyn std::error::Error>> {
        let mut store = HistoryStore::in_memory();
        store.append(entry(40)).await?;
        store.append(entry(42)).await?;
        store.append(entry(42)).await?;

        let ids: Vec<i64> = store.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![43, 42, 40]);
        Ok(())
    }

    #[tokio::test]
    async fn corrupted_storage_loads_empty() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;
        db::put_value(&pool, HISTORY_KEY, "{not json").await?;

        let store = HistoryStore::load(Some(pool.clone())).await;
        assert!(store.is_empty());
        assert!(store.is_persistent());

        db::put_value(&pool, HISTORY_KEY, "{\"entries\": []}").await?;
        assert!(HistoryStore::load(Some(pool)).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;
        let good = serde_json::to_value(entry(7))?;
        let document = serde_json::to_string(&vec![good, serde_json::json!({"id": "x"})])?;
        db::put_value(&pool, HISTORY_KEY, &document).await?;

        let store = HistoryStore::load(Some(pool)).await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].id, 7);
        Ok(())
    }

    #[tokio::test]
    async fn missing_database_runs_in_memory() -> Result<(), Box<dyn std::error::Error>> {
        let mut store = HistoryStore::load(None).await;
        assert!(!store.is_persistent());
        store.append(entry(1)).await?;
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_keeps_entry_in_memory() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;
        let mut store = HistoryStore::load(Some(pool.clone())).await;
        pool.close().await;

        let result = store.append(entry(5)).await;
        assert!(matches!(result, Err(HistoryError::Database(_))));
        assert_eq!(store.entries()[0].id, 5);
        Ok(())
    }
}
