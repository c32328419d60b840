//! Command helpers that don't need the network.

use history::{ChatHistoryStore, INTERACTIONS_KEY, NewMessage, RecentInteractionLog, SESSIONS_KEY};
use rxlog_cli::{
    Backend,
    cmd::{SharedStore, chat::updated_keys},
};
use std::sync::Arc;
use store::{InMemory, Watched};

fn shared() -> SharedStore {
    Arc::new(Watched::new(Backend::InMemory(InMemory::new())))
}

#[test]
fn updated_keys_are_deduplicated_in_order() {
    let store = shared();
    let mut changes = store.subscribe();
    let chats = ChatHistoryStore::new(store.clone());
    let log = RecentInteractionLog::new(store);

    chats.append_message("s1", NewMessage::user("hi"));
    log.record("Aspirin", "Warfarin", "Increased bleeding risk");
    chats.append_message("s1", NewMessage::assistant("hello"));

    assert_eq!(
        updated_keys(&mut changes),
        vec![SESSIONS_KEY.to_owned(), INTERACTIONS_KEY.to_owned()]
    );
    assert!(updated_keys(&mut changes).is_empty());
}

#[test]
fn refused_writes_publish_nothing() {
    let store = shared();
    let mut changes = store.subscribe();
    let log = RecentInteractionLog::new(store);

    assert!(!log.record("  ", "Warfarin", "x"));
    assert!(updated_keys(&mut changes).is_empty());
}
