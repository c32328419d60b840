//! Session management commands: list, show, delete, rename.

use super::{SharedStore, preview};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use history::{ChatHistoryStore, Role};

/// Session management subcommands.
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// List sessions, most recent first.
    List,
    /// Print every message of a session.
    Show {
        /// Session id.
        id: String,
    },
    /// Delete a session.
    Delete {
        /// Session id.
        id: String,
    },
    /// Change a session's title.
    Rename {
        /// Session id.
        id: String,
        /// New title.
        title: String,
    },
}

impl SessionCommand {
    /// Dispatch session management subcommands.
    pub fn run(&self, store: SharedStore) -> Result<()> {
        let chats = ChatHistoryStore::new(store);
        match self {
            Self::List => list(&chats),
            Self::Show { id } => show(&chats, id),
            Self::Delete { id } => {
                if chats.get_session(id).is_none() {
                    println!("No session '{id}'.");
                } else if chats.delete_session(id) {
                    println!("Deleted session '{id}'.");
                } else {
                    anyhow::bail!("failed to delete session '{id}'");
                }
                Ok(())
            }
            Self::Rename { id, title } => {
                if chats.rename_session(id, title) {
                    println!("Renamed '{id}' to \"{title}\".");
                } else {
                    println!("No session '{id}'.");
                }
                Ok(())
            }
        }
    }
}

fn list(chats: &ChatHistoryStore<SharedStore>) -> Result<()> {
    let sessions = chats.list_sessions();
    if sessions.is_empty() {
        println!("No chat sessions.");
        return Ok(());
    }
    for session in &sessions {
        println!(
            "  {}  {}  {} ({} messages)",
            session.id,
            local(&session.timestamp),
            preview(&session.title),
            session.messages.len()
        );
    }
    Ok(())
}

fn show(chats: &ChatHistoryStore<SharedStore>, id: &str) -> Result<()> {
    let Some(session) = chats.get_session(id) else {
        println!("No session '{id}'.");
        return Ok(());
    };
    println!("{}", session.title);
    for message in &session.messages {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!();
        println!("[{}] {who}:", local(&message.timestamp));
        println!("{}", message.content);
        if let Some(drugs) = message.drugs.as_ref().filter(|d| !d.is_empty()) {
            println!("  drugs: {}", drugs.join(", "));
        }
    }
    Ok(())
}

pub(crate) fn local(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
