//! Config management commands: show, init, set.

use crate::config::{self, Config, DEFAULT_CONFIG};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

/// Config management subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the resolved config file.
    Show,
    /// Write the default config if none exists.
    Init,
    /// Set a config value (e.g. `rxlog config set service.base_url http://host:8000`).
    Set {
        /// Dotted key (e.g. `storage.backend`).
        key: String,
        /// Value to set.
        value: String,
    },
}

impl ConfigCommand {
    /// Dispatch config management subcommands.
    pub fn run(&self, config_flag: Option<&Path>) -> Result<()> {
        let path = config::resolve_config_path(config_flag);
        match self {
            Self::Show => show(&path),
            Self::Init => init(&path),
            Self::Set { key, value } => set(&path, key, value),
        }
    }
}

fn show(path: &Path) -> Result<()> {
    if !path.exists() {
        println!("No config file at {}", path.display());
        return Ok(());
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    print!("{contents}");
    Ok(())
}

fn init(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    config::generate_default_config(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let contents = if path.exists() {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        DEFAULT_CONFIG.to_owned()
    };
    let updated = set_value(&contents, key, value)
        .with_context(|| format!("updating {}", path.display()))?;

    // Refuse to write a file that would no longer load.
    Config::from_toml(&updated).with_context(|| format!("invalid value for '{key}'"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, updated).with_context(|| format!("writing {}", path.display()))?;
    println!("Set {key} = {value} in {}", path.display());
    Ok(())
}

/// Apply `key = value` to a TOML document and return the new text.
///
/// Integers and booleans are stored typed, everything else as a string.
pub fn set_value(contents: &str, key: &str, value: &str) -> Result<String> {
    let mut doc: toml::Table = contents.parse()?;
    let value = typed(value);

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        [section, field] => {
            let table = doc
                .entry(*section)
                .or_insert_with(|| toml::Value::Table(toml::Table::new()))
                .as_table_mut()
                .ok_or_else(|| anyhow::anyhow!("'{section}' is not a table"))?;
            table.insert((*field).to_owned(), value);
        }
        [field] => {
            doc.insert((*field).to_owned(), value);
        }
        _ => anyhow::bail!("invalid key format: '{key}' (use 'section.field' or 'field')"),
    }
    Ok(doc.to_string())
}

fn typed(value: &str) -> toml::Value {
    if let Ok(n) = value.parse::<i64>() {
        toml::Value::Integer(n)
    } else if let Ok(b) = value.parse::<bool>() {
        toml::Value::Boolean(b)
    } else {
        toml::Value::String(value.to_owned())
    }
}
