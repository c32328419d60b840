//! Chat sessions persisted as one blob.

use crate::model::{ChatMessage, ChatSession, NewMessage};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::BlobStore;

/// Storage key holding the JSON array of sessions.
pub const SESSIONS_KEY: &str = "chatSessions";

/// A fresh, creation-time-ordered session id.
pub fn new_session_id() -> String {
    ulid::Ulid::new().to_string()
}

/// Durable record of every chat session, addressable by session id.
///
/// Holds no session data in memory: each call reads the full collection,
/// works on a copy and writes it back. Calls on one instance are
/// serialized, so they never lose each other's writes. Separate instances
/// or processes sharing a backend are last-writer-wins.
///
/// Faults never escape. Reads degrade to empty, writes to `false`, and
/// both are logged.
pub struct ChatHistoryStore<S: BlobStore> {
    store: S,
    write: Mutex<()>,
}

impl<S: BlobStore> ChatHistoryStore<S> {
    /// Create a history over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            write: Mutex::new(()),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a message to a session, creating the session if needed.
    pub fn append_message(&self, session_id: &str, message: NewMessage) -> bool {
        let _guard = self.write.lock();
        match self.try_append(session_id, message) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(session = session_id, "failed to save chat message: {e:#}");
                false
            }
        }
    }

    /// All sessions, most recently updated first.
    pub fn list_sessions(&self) -> Vec<ChatSession> {
        let entries = match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("failed to read chat sessions: {e:#}");
                return Vec::new();
            }
        };

        let mut sessions: Vec<ChatSession> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Session(session) => Some(session),
                Entry::Unparsed(_) => None,
            })
            .collect();
        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sessions
    }

    /// Look up one session.
    pub fn get_session(&self, session_id: &str) -> Option<ChatSession> {
        self.list_sessions()
            .into_iter()
            .find(|session| session.id == session_id)
    }

    /// Id of the most recently updated session.
    pub fn latest_session_id(&self) -> Option<String> {
        self.list_sessions()
            .into_iter()
            .next()
            .map(|session| session.id)
    }

    /// Delete a session. Deleting an unknown id succeeds.
    pub fn delete_session(&self, session_id: &str) -> bool {
        let _guard = self.write.lock();
        let result = self.load().and_then(|mut entries| {
            let before = entries.len();
            entries.retain(|entry| entry.session_id() != Some(session_id));
            if entries.len() == before {
                return Ok(());
            }
            self.save(&entries)
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(session = session_id, "failed to delete chat session: {e:#}");
                false
            }
        }
    }

    /// Replace a session's title. `false` if the session does not exist.
    pub fn rename_session(&self, session_id: &str, title: &str) -> bool {
        let _guard = self.write.lock();
        let result = self.load().and_then(|mut entries| {
            let Some(session) = entries.iter_mut().find_map(|e| e.session_mut(session_id)) else {
                bail!("no such session");
            };
            session.title = title.to_owned();
            self.save(&entries)
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(session = session_id, "failed to rename chat session: {e:#}");
                false
            }
        }
    }

    fn try_append(&self, session_id: &str, message: NewMessage) -> Result<()> {
        let now = Utc::now();
        let message = ChatMessage {
            id: ulid::Ulid::new().to_string(),
            role: message.role,
            content: message.content,
            timestamp: now,
            drugs: message.drugs,
        };

        let mut entries = self.load()?;
        let index = match entries
            .iter()
            .position(|e| e.session_id() == Some(session_id))
        {
            Some(index) => index,
            None => {
                tracing::debug!(session = session_id, "creating chat session");
                entries.push(Entry::Session(ChatSession {
                    id: session_id.to_owned(),
                    title: ChatSession::default_title(now),
                    messages: Vec::new(),
                    timestamp: now,
                }));
                entries.len() - 1
            }
        };

        let Some(session) = entries[index].session_mut(session_id) else {
            bail!("no such session");
        };
        if ChatSession::is_default_title(&session.title)
            && let Some(drugs) = &message.drugs
        {
            let named: Vec<String> = drugs
                .iter()
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .map(str::to_owned)
                .collect();
            if !named.is_empty() {
                session.title = ChatSession::drug_title(&named);
            }
        }
        session.messages.push(message);
        session.timestamp = now;

        self.save(&entries)
    }

    /// Read every stored entry. Entries that don't deserialize are kept
    /// as raw JSON so writers put them back untouched. Only a blob that is
    /// not a JSON array is an error.
    fn load(&self) -> Result<Vec<Entry>> {
        let Some(raw) = self.store.get(SESSIONS_KEY)? else {
            return Ok(Vec::new());
        };
        let items = match serde_json::from_str::<Value>(&raw)
            .context("stored chat sessions are not valid JSON")?
        {
            Value::Array(items) => items,
            other => bail!("stored chat sessions is not an array: {other}"),
        };

        Ok(items
            .into_iter()
            .map(|item| match ChatSession::deserialize(&item) {
                Ok(session) => Entry::Session(session),
                Err(e) => {
                    tracing::warn!("skipping malformed chat session: {e}");
                    Entry::Unparsed(item)
                }
            })
            .collect())
    }

    fn save(&self, entries: &[Entry]) -> Result<()> {
        let raw = serde_json::to_string(entries).context("failed to serialize chat sessions")?;
        self.store.set(SESSIONS_KEY, &raw)
    }
}

/// One element of the stored array.
#[derive(Serialize)]
#[serde(untagged)]
enum Entry {
    Session(ChatSession),
    Unparsed(Value),
}

impl Entry {
    fn session_id(&self) -> Option<&str> {
        match self {
            Self::Session(session) => Some(&session.id),
            Self::Unparsed(_) => None,
        }
    }

    fn session_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        match self {
            Self::Session(session) if session.id == id => Some(session),
            _ => None,
        }
    }
}
