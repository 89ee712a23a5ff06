//! Anthropic Generation Client - Implementation for the Claude Messages API.
//!
//! The API has no native structured-output mode here, so the client asks for
//! a bare JSON object, then recovers it from the reply text. Streaming
//! accumulates `content_block_delta` text and re-parses the growing buffer
//! into partial payloads.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new("sk-ant-...")
//!     .with_model("claude-sonnet-4-20250514")
//!     .with_timeout(Duration::from_secs(120));
//!
//! let client = AnthropicGenerationClient::new(config)?;
//! ```

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::json_repair::{extract_json, repair_partial};
use crate::domain::planning::SchemaRef;
use crate::ports::{
    ClientInfo, GenerationClient, GenerationError, GenerationRequest, MessageRole,
    PartialResult, PartialStream, StructuredResult,
};

/// Configuration for the Anthropic client.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_secret(Secret::new(api_key.into()))
    }

    pub fn from_secret(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Generation client backed by the Anthropic Messages API.
pub struct AnthropicGenerationClient {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicGenerationClient {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the API key is blank or the HTTP client cannot
    /// be constructed.
    pub fn new(config: AnthropicConfig) -> Result<Self, GenerationError> {
        if config.api_key().trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Anthropic API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::InvalidRequest(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    fn to_anthropic_request(&self, request: &GenerationRequest, stream: bool) -> AnthropicRequest {
        let mut messages: Vec<AnthropicMessage> = request
            .history
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .map(|m| AnthropicMessage {
                role: match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: m.content.clone(),
            })
            .collect();

        messages.push(AnthropicMessage {
            role: "user".to_string(),
            content: user_content(request),
        });

        AnthropicRequest {
            model: self.config.model.clone(),
            messages: merge_consecutive_roles(messages),
            system: Some(system_prompt(request.schema)),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            stream: Some(stream),
        }
    }

    async fn send(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<Response, GenerationError> {
        let body = self.to_anthropic_request(request, stream);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    GenerationError::network(format!("Connection failed: {}", e))
                } else {
                    GenerationError::network(e.to_string())
                }
            })?;

        handle_response_status(response).await
    }

    async fn generate_once(
        &self,
        request: &GenerationRequest,
    ) -> Result<StructuredResult, GenerationError> {
        let response = self.send(request, false).await?;

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::parse(format!("Failed to parse response: {}", e)))?;

        let text = body
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if body.stop_reason.as_deref() == Some("max_tokens") {
            warn!(schema = %request.schema, "Response truncated at max_tokens");
        }

        payload_from_text(request.schema, &text).map(|p| StructuredResult::new(request.schema, p))
    }
}

#[async_trait]
impl GenerationClient for AnthropicGenerationClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<StructuredResult, GenerationError> {
        let mut retry_count = 0;

        loop {
            match self.generate_once(&request).await {
                Ok(result) => return Ok(result),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    let delay = match &err {
                        GenerationError::RateLimited { retry_after_secs } => {
                            Duration::from_secs(u64::from(*retry_after_secs))
                        }
                        _ => Duration::from_secs(1 << retry_count),
                    };
                    debug!(
                        schema = %request.schema,
                        attempt = retry_count + 1,
                        error = %err,
                        "Retrying generation"
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn stream_generate(
        &self,
        request: GenerationRequest,
    ) -> Result<PartialStream, GenerationError> {
        let response = self.send(&request, true).await?;
        let schema = request.schema;

        let stream = response
            .bytes_stream()
            .scan(SseAccumulator::new(schema), |acc, chunk| {
                let items = match chunk {
                    Ok(bytes) => acc.feed(&String::from_utf8_lossy(&bytes)),
                    Err(e) => vec![Err(GenerationError::network(format!("Stream error: {}", e)))],
                };
                future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo::new("anthropic", &self.config.model)
    }
}

async fn handle_response_status(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => Err(GenerationError::AuthenticationFailed),
        429 => Err(GenerationError::rate_limited(parse_retry_after(&error_body))),
        400 => Err(GenerationError::InvalidRequest(error_body)),
        500..=599 => Err(GenerationError::unavailable(format!(
            "Server error {}: {}",
            status, error_body
        ))),
        _ => Err(GenerationError::network(format!(
            "Unexpected status {}: {}",
            status, error_body
        ))),
    }
}

fn parse_retry_after(error_body: &str) -> u32 {
    serde_json::from_str::<Value>(error_body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
        .and_then(|message| {
            let rest = &message[message.find("try again in ")? + 13..];
            let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            rest[..end].parse().ok()
        })
        .unwrap_or(60)
}

fn system_prompt(schema: SchemaRef) -> String {
    format!(
        "You produce structured data for a project-based learning planner. \
         Respond with ONLY a single JSON object satisfying the `{}` contract. \
         Do not add prose before or after the object.",
        schema
    )
}

fn user_content(request: &GenerationRequest) -> String {
    let prompt = if request.prompt.trim().is_empty() {
        "continue"
    } else {
        request.prompt.as_str()
    };
    if request.deps.is_null() {
        prompt.to_string()
    } else {
        format!("{}\n\nContext:\n{}", prompt, request.deps)
    }
}

/// The Messages API rejects two consecutive turns with the same role.
fn merge_consecutive_roles(messages: Vec<AnthropicMessage>) -> Vec<AnthropicMessage> {
    let mut merged: Vec<AnthropicMessage> = Vec::with_capacity(messages.len());
    for message in messages {
        match merged.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => merged.push(message),
        }
    }
    if merged.first().map_or(false, |m| m.role == "assistant") {
        merged.insert(
            0,
            AnthropicMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            },
        );
    }
    merged
}

fn payload_from_text(schema: SchemaRef, text: &str) -> Result<Value, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    match extract_json(text) {
        Some(value @ Value::Object(_)) => Ok(value),
        Some(_) => Err(GenerationError::schema_validation(
            schema,
            "response is not a JSON object",
        )),
        None => Err(GenerationError::parse("no JSON object in response")),
    }
}

/// Incremental parser for the Messages API event stream.
///
/// Byte chunks may split lines, so incomplete trailing lines are buffered
/// until the next chunk arrives.
struct SseAccumulator {
    schema: SchemaRef,
    line_buffer: String,
    event: String,
    text: String,
    last_partial: Option<Value>,
}

impl SseAccumulator {
    fn new(schema: SchemaRef) -> Self {
        Self {
            schema,
            line_buffer: String::new(),
            event: String::new(),
            text: String::new(),
            last_partial: None,
        }
    }

    fn feed(&mut self, chunk: &str) -> Vec<Result<PartialResult, GenerationError>> {
        self.line_buffer.push_str(chunk);
        let mut results = Vec::new();

        while let Some(newline) = self.line_buffer.find('\n') {
            let line: String = self.line_buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(&['\r', '\n'][..]);

            if let Some(event) = line.strip_prefix("event:") {
                self.event = event.trim().to_string();
            } else if let Some(data) = line.strip_prefix("data:") {
                if let Some(item) = self.on_data(data.trim()) {
                    results.push(item);
                }
            }
        }
        results
    }

    fn on_data(&mut self, data: &str) -> Option<Result<PartialResult, GenerationError>> {
        match self.event.as_str() {
            "content_block_delta" => {
                let delta = serde_json::from_str::<ContentBlockDelta>(data).ok()?;
                self.text.push_str(&delta.delta.text?);

                let partial = repair_partial(&self.text)?;
                if self.last_partial.as_ref() == Some(&partial) {
                    return None;
                }
                self.last_partial = Some(partial.clone());
                Some(Ok(PartialResult::partial(partial)))
            }
            "message_stop" => Some(
                payload_from_text(self.schema, &self.text).map(PartialResult::final_result),
            ),
            "error" => {
                let message = serde_json::from_str::<StreamError>(data)
                    .ok()
                    .and_then(|e| e.error.message)
                    .unwrap_or_else(|| "Stream error".to_string());
                Some(Err(GenerationError::unavailable(message)))
            }
            _ => None,
        }
    }
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlockDelta {
    delta: TextDelta,
}

#[derive(Debug, Deserialize)]
struct TextDelta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    error: StreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StreamErrorDetail {
    message: Option<String>,
}
