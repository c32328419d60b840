//! `chat` and `check`: the flows that talk to the service.

use super::SharedStore;
use crate::{Config, Consult};
use anyhow::Result;
use client::Client;
use store::Change;
use tokio::sync::broadcast::Receiver;

/// Submit one message and print the answer.
pub async fn chat(
    config: &Config,
    store: SharedStore,
    message: &str,
    session: Option<String>,
    new: bool,
) -> Result<()> {
    let client = Client::new(&config.service.base_url, config.service.timeout())?;
    let mut changes = store.subscribe();
    let consult = Consult::new(store, client);

    let session_id = match session {
        Some(id) => id,
        None if new => history::new_session_id(),
        None => consult.resume_or_new(),
    };

    let Some(turn) = consult.submit(&session_id, message).await? else {
        println!("Nothing to send.");
        return Ok(());
    };

    println!("{}", turn.reply.response);
    if let Some(details) = turn.reply.interaction() {
        println!();
        println!(
            "Interaction: {} + {}: {}",
            details.drug1, details.drug2, details.description
        );
    }
    if !turn.saved {
        eprintln!("warning: this turn could not be saved to history");
    }
    report(&mut changes, &turn.session_id);
    Ok(())
}

/// Predict an interaction between two drugs and print it.
pub async fn check(config: &Config, store: SharedStore, drug1: &str, drug2: &str) -> Result<()> {
    let client = Client::new(&config.service.base_url, config.service.timeout())?;
    let mut changes = store.subscribe();
    let consult = Consult::new(store, client);

    let (prediction, recorded) = consult.check(drug1, drug2).await?;
    if prediction.has_interaction {
        let severity = prediction.severity.as_deref().unwrap_or("unknown");
        println!("{drug1} + {drug2}: interaction ({severity} severity)");
    } else {
        println!("{drug1} + {drug2}: no interaction predicted");
    }
    if let Some(description) = &prediction.description {
        println!("{description}");
    }
    println!("confidence: {:.0}%", prediction.confidence * 100.0);
    if recorded {
        report(&mut changes, "-");
    }
    Ok(())
}

/// Print which stored collections changed while the command ran.
fn report(changes: &mut Receiver<Change>, session_id: &str) {
    let keys = updated_keys(changes);
    if !keys.is_empty() {
        eprintln!("session {session_id}; updated {}", keys.join(", "));
    }
}

/// Drain pending changes, returning each changed key once in first-seen order.
pub fn updated_keys(changes: &mut Receiver<Change>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    while let Ok(change) = changes.try_recv() {
        if !keys.contains(&change.key) {
            keys.push(change.key);
        }
    }
    keys
}
