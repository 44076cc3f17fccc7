use sqlx::FromRow;

/// A persisted JSON document
#[derive(Debug, FromRow, Clone)]
pub struct KvRecord {
    pub key: String,
    pub value: String,
    pub updated: String,
}
