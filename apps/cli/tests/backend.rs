//! Tests for the Backend enum dispatch.

use rxlog_cli::{Backend, Config, config::BackendKind};
use store::BlobStore;

fn config_for(kind: &str, dir: &std::path::Path) -> Config {
    let toml = format!("[storage]\nbackend = \"{kind}\"\npath = '{}'\n", dir.display());
    Config::from_toml(&toml).unwrap()
}

fn exercise(backend: &Backend) {
    assert!(backend.get("chatSessions").unwrap().is_none());
    backend.set("chatSessions", "[]").unwrap();
    assert_eq!(backend.get("chatSessions").unwrap().as_deref(), Some("[]"));
    backend.remove("chatSessions").unwrap();
    assert!(backend.get("chatSessions").unwrap().is_none());
}

#[test]
fn in_memory_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Backend::open(&config_for("in_memory", dir.path())).unwrap();
    assert_eq!(backend.kind(), BackendKind::InMemory);
    exercise(&backend);
}

#[test]
fn file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Backend::open(&config_for("file", dir.path())).unwrap();
    assert_eq!(backend.kind(), BackendKind::File);
    exercise(&backend);
}

#[test]
fn file_backend_creates_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    Backend::open(&config_for("file", &data)).unwrap();
    assert!(data.is_dir());
}

#[test]
fn sqlite_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Backend::open(&config_for("sqlite", dir.path())).unwrap();
    assert_eq!(backend.kind(), BackendKind::Sqlite);
    exercise(&backend);
    assert!(dir.path().join("rxlog.db").exists());
}

#[test]
fn file_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for("file", dir.path());
    Backend::open(&config)
        .unwrap()
        .set("recentInteractions", "[]")
        .unwrap();
    let reopened = Backend::open(&config).unwrap();
    assert_eq!(
        reopened.get("recentInteractions").unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn sqlite_backend_reports_unusable_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let err = match Backend::open(&config_for("sqlite", &blocker.join("data"))) {
        Ok(_) => panic!("opened a backend under a regular file"),
        Err(e) => e,
    };
    assert!(format!("{err:#}").contains("failed to create data directory"));
}
