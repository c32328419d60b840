//! CLI argument parsing and subcommand dispatch.

use crate::Backend;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use store::Watched;

pub mod chat;
pub mod config;
pub mod interactions;
pub mod sessions;

pub use config::ConfigCommand;
pub use interactions::InteractionCommand;
pub use sessions::SessionCommand;

/// The store every command works against.
pub type SharedStore = Arc<Watched<Backend>>;

/// Local chat history and drug-interaction log.
#[derive(Parser, Debug)]
#[command(name = "rxlog", about = "Local chat history and drug-interaction log")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Config file override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the assistant and store the turn.
    Chat {
        /// Message content.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
        /// Session to continue. Defaults to the most recent one.
        #[arg(long)]
        session: Option<String>,
        /// Start a new session.
        #[arg(long, conflicts_with = "session")]
        new: bool,
    },
    /// Predict whether two drugs interact and log the result.
    Check {
        /// First drug.
        drug1: String,
        /// Second drug.
        drug2: String,
    },
    /// Manage chat sessions.
    Sessions {
        /// Session subcommand.
        #[command(subcommand)]
        action: SessionCommand,
    },
    /// Manage the recent-interaction log.
    Interactions {
        /// Interaction subcommand.
        #[command(subcommand)]
        action: InteractionCommand,
    },
    /// Manage configuration.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

impl Cli {
    /// Parse config, open storage and run the subcommand.
    pub async fn run(self) -> Result<()> {
        if let Command::Config { action } = &self.command {
            return action.run(self.config.as_deref());
        }

        let config = crate::config::resolve_config(self.config.as_deref())?;
        let store: SharedStore = Arc::new(Watched::new(Backend::open(&config)?));

        match self.command {
            Command::Chat {
                message,
                session,
                new,
            } => chat::chat(&config, store, &message.join(" "), session, new).await,
            Command::Check { drug1, drug2 } => chat::check(&config, store, &drug1, &drug2).await,
            Command::Sessions { action } => action.run(store),
            Command::Interactions { action } => action.run(store).await,
            Command::Config { .. } => Ok(()),
        }
    }
}

/// Shorten `value` to at most 80 characters for one-line listings.
pub(crate) fn preview(value: &str) -> String {
    let line = value.lines().next().unwrap_or_default();
    if line.chars().count() > 80 {
        let end = line
            .char_indices()
            .nth(77)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        format!("{}...", &line[..end])
    } else if value.lines().nth(1).is_some() {
        format!("{line}...")
    } else {
        line.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_joins_words() {
        let cli = Cli::parse_from(["rxlog", "chat", "aspirin", "and", "warfarin?"]);
        match cli.command {
            Command::Chat { message, new, .. } => {
                assert_eq!(message.join(" "), "aspirin and warfarin?");
                assert!(!new);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn new_conflicts_with_session() {
        assert!(Cli::try_parse_from(["rxlog", "chat", "hi", "--new", "--session", "s1"]).is_err());
    }

    #[test]
    fn preview_truncates_long_lines() {
        let long = "x".repeat(100);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), 80);
        assert!(shown.ends_with("..."));
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("first\nsecond"), "first...");
    }
}
