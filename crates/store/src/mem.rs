//! In-memory blob store.

use crate::BlobStore;
use anyhow::{Result, bail};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// In-memory store backed by `Mutex<BTreeMap<String, String>>`.
///
/// Useful for testing and as a throwaway backend. With a quota it
/// rejects writes the way a browser rejects `setItem` once the origin's
/// storage is full.
#[derive(Default, Debug)]
pub struct InMemory {
    blobs: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl InMemory {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that holds at most `bytes` of keys plus values.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            blobs: Mutex::default(),
            quota: Some(bytes),
        }
    }

    /// Create a store pre-populated with blobs.
    pub fn with_blobs(blobs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            blobs: Mutex::new(blobs.into_iter().collect()),
            quota: None,
        }
    }

    /// Total bytes currently stored (keys plus values).
    pub fn usage(&self) -> usize {
        self.blobs
            .lock()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl BlobStore for InMemory {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut blobs = self.blobs.lock();
        if let Some(quota) = self.quota {
            let others: usize = blobs
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                bail!("quota exceeded writing '{key}': {needed} of {quota} bytes");
            }
        }
        blobs.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.blobs.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mem = InMemory::new();
        assert!(mem.get("chatSessions").unwrap().is_none());

        mem.set("chatSessions", "[]").unwrap();
        assert_eq!(mem.get("chatSessions").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn set_replaces() {
        let mem = InMemory::new();
        mem.set("k", "v1").unwrap();
        mem.set("k", "v2").unwrap();
        assert_eq!(mem.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn remove_missing_is_ok() {
        let mem = InMemory::with_blobs([("a".into(), "1".into())]);
        mem.remove("a").unwrap();
        assert!(mem.get("a").unwrap().is_none());
        mem.remove("a").unwrap();
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let mem = InMemory::with_quota(10);
        mem.set("k", "12345").unwrap();
        assert!(mem.set("k", "123456789012").is_err());
        // The rejected write leaves the old value in place.
        assert_eq!(mem.get("k").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        let mem = InMemory::with_quota(10);
        mem.set("k", "123456789").unwrap();
        mem.set("k", "987654321").unwrap();
        assert_eq!(mem.usage(), 10);
    }
}
