//! Chat submission and interaction check flows.
//!
//! Ties the service to local persistence: every turn lands in the chat
//! history, and every interaction the service reports lands in the
//! recent-interaction log.

use anyhow::Result;
use client::{ChatReply, Prediction, Service};
use history::{ChatHistoryStore, ChatSession, NewMessage, RecentInteractionLog};
use store::BlobStore;

/// Result of one submitted chat message.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Session the turn was stored in.
    pub session_id: String,
    /// The service's answer.
    pub reply: ChatReply,
    /// Whether both messages, and any retitle, were persisted.
    pub saved: bool,
    /// Whether an interaction was added to the log.
    pub recorded: bool,
}

/// Chat history, interaction log and service, wired together.
pub struct Consult<S: BlobStore, C: Service> {
    pub chats: ChatHistoryStore<S>,
    pub log: RecentInteractionLog<S>,
    pub service: C,
}

impl<S: BlobStore + Clone, C: Service> Consult<S, C> {
    /// Build both stores over one shared backend.
    pub fn new(store: S, service: C) -> Self {
        Self {
            chats: ChatHistoryStore::new(store.clone()),
            log: RecentInteractionLog::new(store),
            service,
        }
    }
}

impl<S: BlobStore, C: Service> Consult<S, C> {
    /// Session to continue when none is named: the most recent one, or a
    /// fresh id when there is no history yet.
    pub fn resume_or_new(&self) -> String {
        self.chats
            .latest_session_id()
            .unwrap_or_else(history::new_session_id)
    }

    /// Submit a chat message.
    ///
    /// Blank input is ignored (`Ok(None)`). The user message is stored
    /// before the service is called and stays stored if the call fails.
    pub async fn submit(&self, session_id: &str, text: &str) -> Result<Option<Turn>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let mut saved = self.chats.append_message(session_id, NewMessage::user(text));

        let reply = match self.service.chat(text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(session = session_id, "chat request failed: {e:#}");
                return Err(e);
            }
        };

        let mut answer = NewMessage::assistant(reply.response.clone());
        if let Some(drugs) = &reply.drugs {
            answer = answer.with_drugs(drugs.clone());
        }
        saved &= self.chats.append_message(session_id, answer);

        let mut recorded = false;
        if let Some(details) = reply.interaction() {
            recorded = self
                .log
                .record(&details.drug1, &details.drug2, &details.description);
            let title = ChatSession::interaction_title(&details.drug1, &details.drug2);
            saved &= self.chats.rename_session(session_id, &title);
        }

        Ok(Some(Turn {
            session_id: session_id.to_owned(),
            reply,
            saved,
            recorded,
        }))
    }

    /// Ask the predictor about a drug pair, logging any described
    /// interaction. Returns the prediction and whether it was logged.
    pub async fn check(&self, drug1: &str, drug2: &str) -> Result<(Prediction, bool)> {
        let prediction = self.service.predict(drug1, drug2).await?;
        let recorded = match prediction.description.as_deref() {
            Some(description) if !description.trim().is_empty() => {
                self.log.record(drug1, drug2, description)
            }
            _ => false,
        };
        Ok((prediction, recorded))
    }
}
