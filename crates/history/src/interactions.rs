//! Bounded, newest-first feed of drug-pair interactions.

use crate::model::DrugInteractionRecord;
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use store::BlobStore;

/// Storage key holding the JSON array of interaction records.
pub const INTERACTIONS_KEY: &str = "recentInteractions";

/// Most records the log keeps.
pub const MAX_RECENT: usize = 10;

/// Recent-activity feed of detected interactions.
///
/// Same storage discipline as [`ChatHistoryStore`](crate::ChatHistoryStore):
/// no in-memory state, whole-blob read-modify-write, serialized per
/// instance, faults logged and swallowed.
pub struct RecentInteractionLog<S: BlobStore> {
    store: S,
    write: Mutex<()>,
}

impl<S: BlobStore> RecentInteractionLog<S> {
    /// Create a log over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            write: Mutex::new(()),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record an interaction at the head of the log.
    ///
    /// Refuses blank input without touching storage. Evicts the oldest
    /// record once the log holds [`MAX_RECENT`].
    pub fn record(&self, drug1: &str, drug2: &str, description: &str) -> bool {
        let (drug1, drug2, description) = (drug1.trim(), drug2.trim(), description.trim());
        if drug1.is_empty() || drug2.is_empty() || description.is_empty() {
            tracing::warn!(drug1, drug2, "refusing to record interaction with missing fields");
            return false;
        }

        let record = DrugInteractionRecord {
            drug1: drug1.to_owned(),
            drug2: drug2.to_owned(),
            description: description.to_owned(),
            timestamp: Utc::now(),
        };

        let _guard = self.write.lock();
        let raw = match self.store.get(INTERACTIONS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(drug1, drug2, "failed to read interaction log: {e:#}");
                return false;
            }
        };
        let mut records = match raw.as_deref().map(parse_records).transpose() {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("resetting unreadable interaction log: {e:#}");
                Vec::new()
            }
        };
        records.insert(0, record);
        records.truncate(MAX_RECENT);

        match self.save(&records) {
            Ok(()) => {
                tracing::debug!(drug1, drug2, "recorded interaction");
                true
            }
            Err(e) => {
                tracing::warn!(drug1, drug2, "failed to save interaction: {e:#}");
                false
            }
        }
    }

    /// Stored records, newest first. Malformed entries are skipped.
    pub fn list_recent(&self) -> Vec<DrugInteractionRecord> {
        self.read_valid().unwrap_or_else(|e| {
            tracing::warn!("failed to read interaction log: {e:#}");
            Vec::new()
        })
    }

    /// Drop the whole log.
    pub fn clear_all(&self) -> bool {
        let _guard = self.write.lock();
        match self.store.remove(INTERACTIONS_KEY) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to clear interaction log: {e:#}");
                false
            }
        }
    }

    fn read_valid(&self) -> Result<Vec<DrugInteractionRecord>> {
        match self.store.get(INTERACTIONS_KEY)? {
            Some(raw) => parse_records(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[DrugInteractionRecord]) -> Result<()> {
        let raw = serde_json::to_string(records).context("failed to serialize interactions")?;
        self.store.set(INTERACTIONS_KEY, &raw)
    }
}

/// Parse the stored log, keeping only entries with the full record shape.
fn parse_records(raw: &str) -> Result<Vec<DrugInteractionRecord>> {
    let items = match serde_json::from_str::<Value>(raw)
        .context("stored interactions are not valid JSON")?
    {
        Value::Array(items) => items,
        other => anyhow::bail!("stored interactions is not an array: {other}"),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping malformed interaction: {e}");
                None
            }
        })
        .collect())
}
