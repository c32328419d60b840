//! Blob storage port for rxlog.
//!
//! A [`BlobStore`] is a synchronous, string-keyed get/set/remove capability
//! with no transactional guarantees across keys or across writers. Every
//! collection rxlog persists is a single JSON blob under one key; callers
//! read the whole blob, mutate a copy and write the whole blob back.
//!
//! # Backends
//!
//! - [`InMemory`]: volatile map, optionally with a byte quota for exercising
//!   write faults.
//! - [`FileStore`]: one file per key under a data directory.
//! - [`Watched`]: decorator that publishes a [`Change`] for every successful
//!   write made through it.
//!
//! The SQLite backend lives in its own crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use rxlog_store::{BlobStore, InMemory};
//!
//! let store = InMemory::new();
//! store.set("recentInteractions", "[]")?;
//! assert_eq!(store.get("recentInteractions")?.as_deref(), Some("[]"));
//! ```

pub use file::FileStore;
pub use mem::InMemory;
pub use watch::{Change, ChangeKind, Watched};

use anyhow::Result;
use std::sync::Arc;

mod file;
mod mem;
mod watch;

/// Synchronous string-keyed blob storage.
///
/// Uses `&self` for all methods; implementations handle interior
/// mutability themselves.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the blob stored under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: BlobStore + ?Sized> BlobStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: BlobStore + ?Sized> BlobStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
