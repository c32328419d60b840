//! Request and response bodies of the service.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Body of `POST /predict`.
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub drug1: &'a str,
    pub drug2: &'a str,
}

/// The assistant's answer to a chat message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    /// Markdown answer shown to the user.
    #[serde(default)]
    pub response: String,
    /// Short summary of the answer.
    #[serde(default)]
    pub summary: Option<String>,
    /// Drugs the answer mentions.
    #[serde(default)]
    pub drugs: Option<Vec<String>>,
    /// Whether the service detected an interaction.
    #[serde(default)]
    pub interaction_found: bool,
    #[serde(default)]
    pub interaction_details: Option<InteractionDetails>,
    /// Set when the service failed to answer.
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatReply {
    /// The detected interaction, if the service flagged one and described it.
    pub fn interaction(&self) -> Option<&InteractionDetails> {
        self.interaction_details
            .as_ref()
            .filter(|_| self.interaction_found)
    }
}

/// A drug pair the chat service found interacting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InteractionDetails {
    pub drug1: String,
    pub drug2: String,
    pub description: String,
}

/// Outcome of the interaction predictor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub has_interaction: bool,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub confidence: f64,
}

/// Error body some failing responses carry.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
