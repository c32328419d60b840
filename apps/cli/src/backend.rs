//! Storage backend enum for static dispatch over blob store implementations.
//!
//! Wraps [`InMemory`], [`FileStore`] and [`SqliteStore`] with
//! [`BlobStore`] delegation, selected from [`StorageConfig`].

use crate::config::{BackendKind, Config, SQLITE_DB};
use anyhow::{Context, Result};
use sqlite::SqliteStore;
use store::{BlobStore, FileStore, InMemory};

/// Blob store selected from configuration.
pub enum Backend {
    /// Volatile in-memory store.
    InMemory(InMemory),
    /// One file per key under the data directory.
    File(FileStore),
    /// SQLite database in the data directory.
    Sqlite(SqliteStore),
}

impl Backend {
    /// Open the backend the config asks for.
    pub fn open(config: &Config) -> Result<Self> {
        match config.storage.backend {
            BackendKind::InMemory => {
                tracing::info!("using in-memory backend");
                Ok(Self::InMemory(InMemory::new()))
            }
            BackendKind::File => {
                let dir = config.data_dir();
                tracing::info!("using file backend at {}", dir.display());
                Ok(Self::File(FileStore::open(dir)?))
            }
            BackendKind::Sqlite => {
                let dir = config.data_dir();
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create data directory {}", dir.display()))?;
                let path = dir.join(SQLITE_DB);
                tracing::info!("using sqlite backend at {}", path.display());
                Ok(Self::Sqlite(SqliteStore::open(path)?))
            }
        }
    }

    /// The configured kind of this backend.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::InMemory(_) => BackendKind::InMemory,
            Self::File(_) => BackendKind::File,
            Self::Sqlite(_) => BackendKind::Sqlite,
        }
    }
}

impl BlobStore for Backend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Self::InMemory(s) => s.get(key),
            Self::File(s) => s.get(key),
            Self::Sqlite(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::InMemory(s) => s.set(key, value),
            Self::File(s) => s.set(key, value),
            Self::Sqlite(s) => s.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self {
            Self::InMemory(s) => s.remove(key),
            Self::File(s) => s.remove(key),
            Self::Sqlite(s) => s.remove(key),
        }
    }
}
