//! Interaction log commands: list, record, clear, watch.

use super::{SharedStore, preview, sessions::local};
use anyhow::Result;
use clap::Subcommand;
use history::{DrugInteractionRecord, RecentInteractionLog};
use std::time::Duration;

/// Interaction log subcommands.
#[derive(Subcommand, Debug)]
pub enum InteractionCommand {
    /// List recent interactions, newest first.
    List,
    /// Add an interaction to the log.
    Record {
        /// First drug.
        drug1: String,
        /// Second drug.
        drug2: String,
        /// What happens when they are combined.
        description: String,
    },
    /// Remove every logged interaction.
    Clear,
    /// Print the log whenever it changes.
    Watch {
        /// Polling interval in seconds.
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },
}

impl InteractionCommand {
    /// Dispatch interaction log subcommands.
    pub async fn run(&self, store: SharedStore) -> Result<()> {
        let log = RecentInteractionLog::new(store);
        match self {
            Self::List => {
                print_records(&log.list_recent());
                Ok(())
            }
            Self::Record {
                drug1,
                drug2,
                description,
            } => {
                if log.record(drug1, drug2, description) {
                    println!("Recorded {} + {}.", drug1.trim(), drug2.trim());
                    Ok(())
                } else {
                    anyhow::bail!("interaction not recorded: drug names and description must not be blank or storage failed")
                }
            }
            Self::Clear => {
                if log.clear_all() {
                    println!("Cleared recent interactions.");
                    Ok(())
                } else {
                    anyhow::bail!("failed to clear recent interactions")
                }
            }
            Self::Watch { interval } => watch(&log, Duration::from_secs((*interval).max(1))).await,
        }
    }
}

fn print_records(records: &[DrugInteractionRecord]) {
    if records.is_empty() {
        println!("No recent interactions.");
        return;
    }
    for record in records {
        println!(
            "  {}  {} + {}: {}",
            local(&record.timestamp),
            record.drug1,
            record.drug2,
            preview(&record.description)
        );
    }
}

/// Other processes write to the same storage without notifying us, so the
/// log is re-read on a timer and printed only when it differs.
async fn watch(log: &RecentInteractionLog<SharedStore>, every: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    let mut last: Option<Vec<DrugInteractionRecord>> = None;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let current = log.list_recent();
                if last.as_ref() != Some(&current) {
                    print_records(&current);
                    println!();
                    last = Some(current);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("watch interrupted");
                return Ok(());
            }
        }
    }
}
