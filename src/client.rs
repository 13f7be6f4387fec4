//! HTTP client for the course-recommendation backend.
//!
//! One POST per user turn; the backend owns conversation durability and
//! the client carries no retry loop. A failed turn is surfaced as a
//! typed error and the user retries by sending again.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use thiserror::Error;

use crate::config::Config;
use crate::models::{ChatRequest, ChatResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_CHARS: usize = 300;

// === Types ===

/// Typed failure modes for one backend exchange.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode backend reply: {0}")]
    Decode(String),
}

/// Client for the chatbot message endpoint.
#[derive(Debug, Clone)]
#[must_use]
pub struct ChatbotClient {
    http_client: reqwest::Client,
    message_url: String,
}

// === ChatbotClient ===

impl ChatbotClient {
    /// Create a client from CLI configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::from_base_url(&config.backend_base_url())
    }

    /// Create a client against an explicit base URL.
    pub fn from_base_url(base_url: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            message_url: format!(
                "{}/api/chatbot/message",
                base_url.trim_end_matches('/')
            ),
        })
    }

    /// Send one turn to the backend and decode its reply.
    pub async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let response = self
            .http_client
            .post(&self.message_url)
            .json(request)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    ClientError::Timeout
                } else {
                    ClientError::Network(error.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|error| ClientError::Decode(error.to_string()))
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let head: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!("{head}…")
}
