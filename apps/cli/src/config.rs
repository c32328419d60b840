//! Configuration loaded from TOML.
//!
//! Resolves `config.toml` in priority order:
//! 1. `--config <path>` flag (explicit override)
//! 2. `{cwd}/.rxlog/config.toml` (workspace config)
//! 3. `~/.config/rxlog/config.toml` (global default)
//!
//! If the global default doesn't exist, it is generated automatically.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config and data directory name under the platform directories.
pub const APP_DIR: &str = "rxlog";
/// Config filename.
pub const CONFIG_FILE: &str = "config.toml";
/// SQLite database filename inside the data directory.
pub const SQLITE_DB: &str = "rxlog.db";

/// Default config template generated when no config exists.
pub const DEFAULT_CONFIG: &str = r#"[storage]
# "file", "sqlite" or "in_memory"
backend = "file"

[service]
base_url = "http://localhost:8000"
timeout_secs = 30
"#;

/// Top-level configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where history is kept.
    #[serde(default)]
    pub storage: StorageConfig,
    /// The chat/prediction service.
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Storage backend configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend type.
    pub backend: BackendKind,
    /// Data directory override. Defaults to the platform data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Storage backend kind.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Volatile, gone when the process exits.
    InMemory,
    /// One JSON file per collection.
    #[default]
    File,
    /// A single SQLite database.
    Sqlite,
}

/// Service configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the service (supports `${ENV_VAR}` expansion).
    pub base_url: String,
    /// Request timeout in seconds; unset means the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: client::DEFAULT_BASE_URL.to_owned(),
            timeout_secs: Some(30),
        }
    }
}

impl ServiceConfig {
    /// The request timeout, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Parse a TOML string, expanding `${VAR}` patterns first.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Resolve the data directory: the configured path, else the platform
    /// data dir.
    pub fn data_dir(&self) -> PathBuf {
        match &self.storage.path {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
                .unwrap_or_else(|| PathBuf::from(".local/share"))
                .join(APP_DIR),
        }
    }
}

/// Resolve the config following the priority chain.
pub fn resolve_config(config_flag: Option<&Path>) -> Result<Config> {
    let path = resolve_config_path(config_flag);
    if config_flag.is_none() && !path.exists() {
        generate_default_config(&path)?;
        tracing::info!("generated default config at {}", path.display());
    }
    Config::load(&path)
}

/// The config file that [`resolve_config`] would read.
pub fn resolve_config_path(config_flag: Option<&Path>) -> PathBuf {
    if let Some(path) = config_flag {
        return path.to_path_buf();
    }
    let workspace = PathBuf::from(".rxlog").join(CONFIG_FILE);
    if workspace.exists() {
        return workspace;
    }
    global_config_path()
}

/// Path to the global default config.
pub fn global_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Write the default config to `path`, creating parent directories.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(())
}

/// Expand `${VAR}` and `${VAR:-default}` from the environment.
///
/// An unset or empty variable takes its default, or expands to nothing
/// when there is none. An unterminated `${` is kept as written.
pub fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let (name, default) = match after[..end].split_once(":-") {
            Some((name, default)) => (name, default),
            None => (&after[..end], ""),
        };
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => out.push_str(&value),
            _ => out.push_str(default),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
