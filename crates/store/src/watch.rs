//! Change-notification decorator.

use crate::BlobStore;
use anyhow::Result;
use tokio::sync::broadcast;

/// Buffered changes per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The blob was replaced.
    Set,
    /// The blob was removed.
    Removed,
}

/// A successful write made through a [`Watched`] store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// The key that changed.
    pub key: String,
    /// How it changed.
    pub kind: ChangeKind,
}

/// A store wrapper that publishes every successful write.
///
/// Delegates all [`BlobStore`] methods to the inner store. After a `set`
/// or `remove` succeeds, a [`Change`] is sent to every live subscriber.
/// Failed writes publish nothing. Only writes made through this wrapper
/// are seen; other processes writing the same backend are not.
///
/// # Example
///
/// ```rust,ignore
/// let store = Watched::new(InMemory::new());
/// let mut rx = store.subscribe();
/// store.set("recentInteractions", "[]")?;
/// assert_eq!(rx.try_recv()?.key, "recentInteractions");
/// ```
#[derive(Debug)]
pub struct Watched<S: BlobStore> {
    inner: S,
    tx: broadcast::Sender<Change>,
}

impl<S: BlobStore> Watched<S> {
    /// Wrap a store.
    pub fn new(inner: S) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { inner, tx }
    }

    /// Subscribe to changes made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.tx.subscribe()
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn publish(&self, key: &str, kind: ChangeKind) {
        // No subscribers is fine.
        let _ = self.tx.send(Change {
            key: key.to_owned(),
            kind,
        });
    }
}

impl<S: BlobStore> BlobStore for Watched<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)?;
        self.publish(key, ChangeKind::Set);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)?;
        self.publish(key, ChangeKind::Removed);
        Ok(())
    }
}
