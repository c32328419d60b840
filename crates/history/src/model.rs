//! Persisted record types.
//!
//! Field names match the JSON the web client wrote, so existing blobs
//! deserialize unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Date formats a default session title may carry after `"Chat "`.
const TITLE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message before it is stored: no id, no timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub drugs: Option<Vec<String>>,
}

impl NewMessage {
    /// A user message without drug annotations.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            drugs: None,
        }
    }

    /// An assistant message without drug annotations.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            drugs: None,
        }
    }

    /// Attach the drugs this message mentions.
    pub fn with_drugs(mut self, drugs: Vec<String>) -> Self {
        self.drugs = Some(drugs);
        self
    }
}

/// One stored chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drugs: Option<Vec<String>>,
}

/// A conversation: an append-only message list plus a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    /// Time of the most recent append.
    pub timestamp: DateTime<Utc>,
}

impl ChatSession {
    /// Title given to a session created at `at`.
    pub fn default_title(at: DateTime<Utc>) -> String {
        format!("Chat {}", at.format("%Y-%m-%d"))
    }

    /// Whether `title` is still a date-stamped default title.
    pub fn is_default_title(title: &str) -> bool {
        title.strip_prefix("Chat ").is_some_and(|rest| {
            TITLE_DATE_FORMATS
                .iter()
                .any(|fmt| NaiveDate::parse_from_str(rest, fmt).is_ok())
        })
    }

    /// Title derived from the drugs a message mentions.
    pub fn drug_title(drugs: &[String]) -> String {
        format!("Chat about {}", drugs.join(", "))
    }

    /// Title given once an interaction between two drugs was found.
    pub fn interaction_title(drug1: &str, drug2: &str) -> String {
        format!("Chat about {drug1} and {drug2}")
    }
}

/// A cached drug-pair interaction summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugInteractionRecord {
    pub drug1: String,
    pub drug2: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}
