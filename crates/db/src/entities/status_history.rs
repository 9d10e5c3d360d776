//! Status history records shared by opportunities and applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// One entry of an append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry<S> {
    pub status: S,
    #[serde(default)]
    pub reason: Option<String>,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

impl<S: Serialize> StatusHistoryEntry<S> {
    /// JSON array holding only this entry, ready to be appended with `||`.
    #[must_use]
    pub fn as_append_value(&self) -> serde_json::Value {
        serde_json::json!([self])
    }
}

/// Decode a stored history column.
///
/// Entries that no longer decode are skipped rather than failing the read.
#[must_use]
pub fn decode_history<S: DeserializeOwned>(value: &serde_json::Value) -> Vec<StatusHistoryEntry<S>> {
    match value.as_array() {
        Some(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        None => Vec::new(),
    }
}
