//! Chat completion API client
//!
//! Talks to an OpenAI-style completions endpoint with:
//! - Streaming mode: fragments decoded as they arrive, no retries
//! - Buffered mode: one JSON body per attempt under the retry budget
//! - Auth: Bearer token on every request

use crate::api::request::ChatRequest;
use crate::api::retry::RetryPolicy;
use crate::config::Config;
use crate::errors::{ChatError, Result};
use crate::streaming::fragment_stream;
use crate::types::{ApiReply, ChatTurn};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use log::{debug, warn};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Default chat completions endpoint
pub const DEFAULT_API_URL: &str = "https://api.siliconflow.cn/v1/chat/completions";

/// Default model
pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Qwen-7B";

/// Connection timeout for all requests (10 seconds)
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total timeout for one buffered request (30 seconds); streaming requests
/// run without one so long replies are never cut off
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat API client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl ChatClient {
    /// Create a client from loaded configuration.
    ///
    /// Fails when no API key is available from the config file or the
    /// environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            ChatError::Config(format!(
                "no API key configured; set {} or api_key in the config file",
                crate::config::API_KEY_ENV
            ))
        })?;

        Self::with_config(&config.api_url, &api_key, &config.model, config.max_attempts)
    }

    /// Create a client with explicit settings
    pub fn with_config(
        api_url: &str,
        api_key: &str,
        model: &str,
        max_attempts: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(ChatError::Transport)?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            retry: RetryPolicy::with_max_attempts(max_attempts),
        })
    }

    /// Open a streaming reply for `message`.
    ///
    /// A failure before the response opens is returned here and is terminal
    /// for the call; once open, transport failures surface through the
    /// fragment stream after whatever was already decoded. Dropping the
    /// returned stream closes the connection.
    pub async fn chat_stream(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<impl Stream<Item = Result<String>>> {
        let transport = self.open_stream(message, history).await?;
        Ok(fragment_stream(transport))
    }

    /// Ask for a complete reply in one buffered body.
    ///
    /// Runs under the retry budget and never fails the caller: an exhausted
    /// budget comes back as a reply carrying the last error message.
    pub async fn ask(&self, message: &str, history: &[ChatTurn]) -> ApiReply {
        let result = self
            .retry
            .execute_with_retry(|attempt| {
                debug!(
                    "chat request attempt {}/{}",
                    attempt,
                    self.retry.max_attempts()
                );
                self.request_once(message, history)
            })
            .await;

        match result {
            Ok(text) => ApiReply::ok(text),
            Err(err) => {
                warn!("chat request failed: {}", err);
                ApiReply::failed(err.to_string())
            }
        }
    }

    /// Issue one minimal buffered request in a single attempt, outside the
    /// retry budget.
    ///
    /// Exercises the full chat path: endpoint, key, model, and body shape.
    /// An unreachable endpoint, a non-success status (a rejected key
    /// included), or an unreadable body all come back as the error.
    pub async fn health_check(&self) -> Result<()> {
        self.request_once("ping", &[]).await.map(|_| ())
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the endpoint URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn open_stream(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<impl Stream<Item = Result<Bytes>> + Send + 'static> {
        let request = ChatRequest::new(&self.model, message, history, true);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;

        Ok(response
            .bytes_stream()
            .map(|result| result.map_err(|e| ChatError::MidStream(e.to_string()))))
    }

    async fn request_once(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let request = ChatRequest::new(&self.model, message, history, false);

        let response = self
            .client
            .post(&self.api_url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;

        let body: Value = response.json().await.map_err(|_| ChatError::BodyMissing)?;

        // A reply without the expected field is an empty success, not an error
        let text = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        Ok(text)
    }

    async fn check_status(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let detail = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        Err(ChatError::ApiStatus { status, detail })
    }
}
