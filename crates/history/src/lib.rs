//! Local chat history and recent-interaction log for rxlog.
//!
//! Two independent collections, each persisted as a single JSON blob in a
//! [`BlobStore`](store::BlobStore):
//!
//! - [`ChatHistoryStore`] under [`SESSIONS_KEY`]: chat sessions and their
//!   append-only message lists.
//! - [`RecentInteractionLog`] under [`INTERACTIONS_KEY`]: at most
//!   [`MAX_RECENT`] drug-pair interaction summaries, newest first.
//!
//! This is best-effort caching of non-critical UI state. No operation
//! returns an error: reads degrade to empty collections and writes report
//! `false`, with the cause logged through `tracing`.
//!
//! # Example
//!
//! ```rust,ignore
//! use rxlog_history::{ChatHistoryStore, NewMessage, RecentInteractionLog, new_session_id};
//! use std::sync::Arc;
//! use store::InMemory;
//!
//! let backend = Arc::new(InMemory::new());
//! let chats = ChatHistoryStore::new(backend.clone());
//! let log = RecentInteractionLog::new(backend);
//!
//! let id = new_session_id();
//! chats.append_message(&id, NewMessage::user("Aspirin with warfarin?"));
//! log.record("Aspirin", "Warfarin", "Increased bleeding risk");
//! ```

pub use chat::{ChatHistoryStore, SESSIONS_KEY, new_session_id};
pub use interactions::{INTERACTIONS_KEY, MAX_RECENT, RecentInteractionLog};
pub use model::{ChatMessage, ChatSession, DrugInteractionRecord, NewMessage, Role};

mod chat;
mod interactions;
mod model;
