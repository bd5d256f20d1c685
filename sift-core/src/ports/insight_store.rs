//! Saved insight storage port

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved query document as held by a store
///
/// The document is opaque to the store; it is validated when loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInsight {
    pub id: Uuid,
    pub name: String,
    pub document: String,
    pub updated_at: DateTime<Utc>,
}

/// Persistence for saved query documents, keyed by name
pub trait InsightStore {
    /// All stored insights, ordered by name
    fn list(&self) -> Result<Vec<StoredInsight>>;

    fn get(&self, name: &str) -> Result<Option<StoredInsight>>;

    /// Insert or overwrite the document stored under `name`
    fn save(&self, name: &str, document: &str) -> Result<StoredInsight>;

    /// Remove an insight, returning whether it existed
    fn remove(&self, name: &str) -> Result<bool>;
}
