//! Client for the rxlog chat and interaction-prediction service.
//!
//! The service exposes two JSON endpoints:
//!
//! - `POST {base}/chat` with `{ "message": ... }` returning a [`ChatReply`].
//! - `POST {base}/predict` with `{ "drug1": ..., "drug2": ... }` returning a
//!   [`Prediction`].
//!
//! [`Service`] abstracts both calls so callers can swap in a fake.

pub use types::{ChatReply, InteractionDetails, Prediction};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::{future::Future, time::Duration};
use types::{ChatRequest, ErrorBody, PredictRequest};

mod types;

/// Default service location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path of the chat endpoint under the base URL.
pub const CHAT_PATH: &str = "/chat";

/// Path of the prediction endpoint under the base URL.
pub const PREDICT_PATH: &str = "/predict";

/// Longest error body echoed back in a [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Failures reported by the service itself.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx HTTP status.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },
    /// 2xx reply carrying an `error` field.
    #[error("service error: {0}")]
    Service(String),
}

/// The chat and prediction calls.
pub trait Service: Send + Sync {
    /// Ask the assistant a question.
    fn chat(&self, message: &str) -> impl Future<Output = Result<ChatReply>> + Send;

    /// Predict whether two drugs interact.
    fn predict(&self, drug1: &str, drug2: &str)
    -> impl Future<Output = Result<Prediction>> + Send;
}

/// HTTP implementation of [`Service`].
#[derive(Clone, Debug)]
pub struct Client {
    /// The HTTP client.
    pub client: reqwest::Client,
    chat_endpoint: String,
    predict_endpoint: String,
}

impl Client {
    /// Create a client for the service at `base_url`.
    ///
    /// Without a timeout, requests rely on the transport's defaults.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build http client")?;
        Ok(Self::custom(
            client,
            &endpoint(base_url, CHAT_PATH),
            &endpoint(base_url, PREDICT_PATH),
        ))
    }

    /// Create a client with explicit endpoint URLs.
    pub fn custom(client: reqwest::Client, chat_endpoint: &str, predict_endpoint: &str) -> Self {
        Self {
            client,
            chat_endpoint: chat_endpoint.to_owned(),
            predict_endpoint: predict_endpoint.to_owned(),
        }
    }

    /// URL chat messages are posted to.
    pub fn chat_endpoint(&self) -> &str {
        &self.chat_endpoint
    }

    /// URL prediction requests are posted to.
    pub fn predict_endpoint(&self) -> &str {
        &self.predict_endpoint
    }

    async fn post<B: serde::Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        tracing::trace!("request to {url}: {}", serde_json::to_string(body)?);
        let response = self
            .client
            .request(Method::POST, url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("failed to read response from {url}"))?;
        tracing::trace!("response {status}: {text}");
        decode(status, &text)
    }
}

impl Service for Client {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        let reply: ChatReply = self
            .post(&self.chat_endpoint, &ChatRequest { message })
            .await?;
        if let Some(error) = reply.error {
            return Err(ClientError::Service(error).into());
        }
        Ok(reply)
    }

    async fn predict(&self, drug1: &str, drug2: &str) -> Result<Prediction> {
        self.post(&self.predict_endpoint, &PredictRequest { drug1, drug2 })
            .await
    }
}

/// Join `base` and `path` with exactly one slash between them.
fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turn a status and body into a typed reply or a [`ClientError`].
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect());
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        }
        .into());
    }
    serde_json::from_str(body).context("service returned malformed json")
}
