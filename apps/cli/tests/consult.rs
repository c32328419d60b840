//! Chat submission and interaction check flows against a scripted service.

use anyhow::Result;
use client::{ChatReply, InteractionDetails, Prediction, Service};
use history::{INTERACTIONS_KEY, Role, SESSIONS_KEY};
use rxlog_cli::Consult;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use store::{BlobStore, InMemory};

/// Service that answers every call with a canned reply.
#[derive(Default)]
struct Scripted {
    reply: Option<ChatReply>,
    prediction: Option<Prediction>,
    calls: AtomicUsize,
}

impl Service for Scripted {
    async fn chat(&self, _message: &str) -> Result<ChatReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| anyhow::anyhow!("service unavailable"))
    }

    async fn predict(&self, _drug1: &str, _drug2: &str) -> Result<Prediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prediction
            .clone()
            .ok_or_else(|| anyhow::anyhow!("service unavailable"))
    }
}

fn answer(text: &str) -> ChatReply {
    ChatReply {
        response: text.to_owned(),
        ..Default::default()
    }
}

fn consult(service: Scripted) -> Consult<Arc<InMemory>, Scripted> {
    Consult::new(Arc::new(InMemory::new()), service)
}

#[tokio::test]
async fn submit_stores_both_messages() {
    let consult = consult(Scripted {
        reply: Some(answer("Take it with food.")),
        ..Default::default()
    });

    let turn = consult
        .submit("s1", "How should I take ibuprofen?")
        .await
        .unwrap()
        .unwrap();
    assert!(turn.saved);
    assert!(!turn.recorded);
    assert_eq!(turn.session_id, "s1");

    let session = consult.chats.get_session("s1").unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].role, Role::User);
    assert_eq!(session.messages[0].content, "How should I take ibuprofen?");
    assert_eq!(session.messages[1].role, Role::Assistant);
    assert_eq!(session.messages[1].content, "Take it with food.");
}

#[tokio::test]
async fn submit_titles_session_from_reply_drugs() {
    let consult = consult(Scripted {
        reply: Some(ChatReply {
            response: "Ibuprofen is an NSAID.".into(),
            drugs: Some(vec!["Ibuprofen".into()]),
            ..Default::default()
        }),
        ..Default::default()
    });

    consult.submit("s1", "what is ibuprofen").await.unwrap();
    let session = consult.chats.get_session("s1").unwrap();
    assert_eq!(session.title, "Chat about Ibuprofen");
    assert_eq!(
        session.messages[1].drugs.as_deref(),
        Some(&["Ibuprofen".to_owned()][..])
    );
}

#[tokio::test]
async fn submit_records_reported_interaction() {
    let consult = consult(Scripted {
        reply: Some(ChatReply {
            response: "Yes, they interact.".into(),
            interaction_found: true,
            interaction_details: Some(InteractionDetails {
                drug1: "Aspirin".into(),
                drug2: "Warfarin".into(),
                description: "Increased bleeding risk".into(),
            }),
            ..Default::default()
        }),
        ..Default::default()
    });

    let turn = consult
        .submit("s1", "aspirin and warfarin?")
        .await
        .unwrap()
        .unwrap();
    assert!(turn.recorded);

    let recent = consult.log.list_recent();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].drug1, "Aspirin");
    assert_eq!(recent[0].drug2, "Warfarin");
    assert_eq!(recent[0].description, "Increased bleeding risk");

    let session = consult.chats.get_session("s1").unwrap();
    assert_eq!(session.title, "Chat about Aspirin and Warfarin");
}

#[tokio::test]
async fn details_without_flag_are_not_recorded() {
    let consult = consult(Scripted {
        reply: Some(ChatReply {
            response: "No interaction.".into(),
            interaction_found: false,
            interaction_details: Some(InteractionDetails {
                drug1: "Aspirin".into(),
                drug2: "Vitamin C".into(),
                description: "None".into(),
            }),
            ..Default::default()
        }),
        ..Default::default()
    });

    let turn = consult.submit("s1", "aspirin + C?").await.unwrap().unwrap();
    assert!(!turn.recorded);
    assert!(consult.log.list_recent().is_empty());
}

#[tokio::test]
async fn failed_call_keeps_user_message() {
    let consult = consult(Scripted::default());

    assert!(consult.submit("s1", "hello").await.is_err());
    let session = consult.chats.get_session("s1").unwrap();
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].role, Role::User);
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let consult = consult(Scripted {
        reply: Some(answer("unused")),
        ..Default::default()
    });

    assert!(consult.submit("s1", "   ").await.unwrap().is_none());
    assert_eq!(consult.service.calls.load(Ordering::SeqCst), 0);
    assert!(consult.chats.list_sessions().is_empty());
}

#[tokio::test]
async fn resume_picks_latest_session() {
    let consult = consult(Scripted {
        reply: Some(answer("ok")),
        ..Default::default()
    });

    let fresh = consult.resume_or_new();
    assert!(!fresh.is_empty());
    assert!(consult.chats.get_session(&fresh).is_none());

    consult.submit("older", "first").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    consult.submit("newer", "second").await.unwrap();
    assert_eq!(consult.resume_or_new(), "newer");
}

#[tokio::test]
async fn check_records_described_prediction() {
    let consult = consult(Scripted {
        prediction: Some(Prediction {
            has_interaction: true,
            severity: Some("major".into()),
            description: Some("Increased bleeding risk".into()),
            confidence: 0.92,
        }),
        ..Default::default()
    });

    let (prediction, recorded) = consult.check("Aspirin", "Warfarin").await.unwrap();
    assert!(prediction.has_interaction);
    assert!(recorded);
    assert_eq!(consult.log.list_recent()[0].drug2, "Warfarin");
}

#[tokio::test]
async fn check_without_description_records_nothing() {
    let consult = consult(Scripted {
        prediction: Some(Prediction {
            has_interaction: false,
            severity: None,
            description: None,
            confidence: 0.4,
        }),
        ..Default::default()
    });

    let (_, recorded) = consult.check("Aspirin", "Vitamin C").await.unwrap();
    assert!(!recorded);
    assert!(consult.log.list_recent().is_empty());
}

#[tokio::test]
async fn check_error_propagates() {
    let consult = consult(Scripted::default());
    assert!(consult.check("Aspirin", "Warfarin").await.is_err());
    assert!(consult.log.list_recent().is_empty());
}

#[tokio::test]
async fn storage_faults_do_not_fail_the_turn() {
    let store = Arc::new(InMemory::with_quota(16));
    let consult = Consult::new(
        store.clone(),
        Scripted {
            reply: Some(answer("A fairly long answer that will not fit.")),
            ..Default::default()
        },
    );

    let turn = consult.submit("s1", "question").await.unwrap().unwrap();
    assert!(!turn.saved);
    assert_eq!(turn.reply.response, "A fairly long answer that will not fit.");
    assert!(store.get(SESSIONS_KEY).unwrap().is_none());
    assert!(store.get(INTERACTIONS_KEY).unwrap().is_none());
}

/// Store that accepts a fixed number of writes, then fails.
struct WriteBudget {
    inner: InMemory,
    left: AtomicUsize,
}

impl BlobStore for WriteBudget {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self
            .left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
        {
            anyhow::bail!("quota exceeded writing '{key}'");
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

#[tokio::test]
async fn failed_retitle_marks_turn_unsaved() {
    // User message, assistant message and the log entry fit; the retitle does not.
    let store = Arc::new(WriteBudget {
        inner: InMemory::new(),
        left: AtomicUsize::new(3),
    });
    let consult = Consult::new(
        store,
        Scripted {
            reply: Some(ChatReply {
                response: "Yes, they interact.".into(),
                interaction_found: true,
                interaction_details: Some(InteractionDetails {
                    drug1: "Aspirin".into(),
                    drug2: "Warfarin".into(),
                    description: "Increased bleeding risk".into(),
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
    );

    let turn = consult.submit("s1", "aspirin and warfarin?").await.unwrap().unwrap();
    assert!(turn.recorded);
    assert!(!turn.saved);
    assert_eq!(consult.chats.get_session("s1").unwrap().messages.len(), 2);
    assert_ne!(
        consult.chats.get_session("s1").unwrap().title,
        "Chat about Aspirin and Warfarin"
    );
}

