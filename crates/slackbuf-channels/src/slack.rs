//! Slack channel. Posts messages through `chat.postMessage`.
//!
//! Each call is one JSON POST authenticated with a bot token. The channel
//! never retries; callers decide what to do with a failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slackbuf_core::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS, SlackConfig};
use slackbuf_core::error::{Result, SlackBufError};
use slackbuf_core::traits::Delivery;
use std::time::Duration;

const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Body of a `chat.postMessage` call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SlackRequest {
    pub channel: String,
    pub text: String,
}

/// The part of Slack's reply we look at.
#[derive(Debug, Clone, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API channel.
pub struct SlackChannel {
    channel: String,
    token: String,
    api_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl SlackChannel {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            token: token.into(),
            api_url: DEFAULT_API_URL.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn from_config(config: &SlackConfig) -> Self {
        Self::new(config.token.clone(), config.channel.clone()).with_api_url(config.api_url.clone())
    }

    /// Point at a different endpoint (proxies, tests).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a message to the configured channel.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let body = serde_json::to_vec(&SlackRequest {
            channel: self.channel.clone(),
            text: text.to_string(),
        })
        .map_err(|e| SlackBufError::Encode(e.to_string()))?;

        let request = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .timeout(self.timeout)
            .body(body)
            .build()
            .map_err(|e| SlackBufError::Request(e.to_string()))?;

        let response = self.client.execute(request).await.map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;
        if !status.is_success() {
            return Err(SlackBufError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        // Slack reports most failures as 200 with `ok: false`.
        if let Ok(reply) = serde_json::from_str::<SlackResponse>(&text) {
            if !reply.ok {
                let reason = reply.error.unwrap_or_else(|| "unknown error".into());
                return Err(SlackBufError::Api(reason));
            }
        }

        tracing::trace!("Slack accepted {} bytes for {}", text.len(), self.channel);
        Ok(())
    }

    fn classify(&self, e: reqwest::Error) -> SlackBufError {
        if e.is_timeout() {
            SlackBufError::Timeout(format!("slack did not answer within {:?}", self.timeout))
        } else {
            SlackBufError::transport(e.to_string())
        }
    }
}

#[async_trait]
impl Delivery for SlackChannel {
    fn name(&self) -> &str { "slack" }

    async fn deliver(&self, message: &str) -> Result<()> {
        self.send_message(message).await
    }
}
