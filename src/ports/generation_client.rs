//! Generation Client Port - Interface for the structured-output generator.
//!
//! Every pipeline step asks an external text-generation service for a JSON
//! payload matching one of the [`SchemaRef`] contracts. This port hides the
//! provider; steps only see raw structured values that they normalize
//! through their payload's canonical adapter.
//!
//! # Design
//!
//! - Single-shot and streaming variants
//! - Streaming yields successive partial payloads, the last marked final
//! - Provider-agnostic message history
//! - Error types for the failure modes steps turn into fallbacks

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::conversation::{ConversationTurn, TurnRole};
use crate::domain::foundation::{SessionId, ThreadId};
use crate::domain::planning::SchemaRef;

/// Stream of partial results ending with a final one.
pub type PartialStream = Pin<Box<dyn Stream<Item = Result<PartialResult, GenerationError>> + Send>>;

/// Port for structured generation.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generates one complete structured result.
    async fn generate(&self, request: GenerationRequest)
        -> Result<StructuredResult, GenerationError>;

    /// Generates a result as a stream of partial payloads.
    ///
    /// Each item carries the whole payload known so far, not a delta. The
    /// last item has `is_final` set.
    async fn stream_generate(&self, request: GenerationRequest)
        -> Result<PartialStream, GenerationError>;

    /// Provider name and model.
    fn client_info(&self) -> ClientInfo;
}

/// Request for one structured result.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Contract the result must satisfy.
    pub schema: SchemaRef,
    /// Instruction for this call.
    pub prompt: String,
    /// Earlier conversation turns, oldest first.
    pub history: Vec<Message>,
    /// Step-specific context, opaque to the client.
    pub deps: serde_json::Value,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness.
    pub temperature: Option<f32>,
    /// Tracing metadata.
    pub metadata: RequestMetadata,
}

impl GenerationRequest {
    pub fn new(schema: SchemaRef, prompt: impl Into<String>, metadata: RequestMetadata) -> Self {
        Self {
            schema,
            prompt: prompt.into(),
            history: Vec::new(),
            deps: serde_json::Value::Null,
            max_tokens: None,
            temperature: None,
            metadata,
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_deps(mut self, deps: serde_json::Value) -> Self {
        self.deps = deps;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// A message in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<ConversationTurn> for Message {
    fn from(turn: ConversationTurn) -> Self {
        let role = match turn.role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        };
        Self::new(role, turn.content)
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub session_id: SessionId,
    pub thread_id: Option<ThreadId>,
    /// Name of the calling step.
    pub step: String,
}

impl RequestMetadata {
    pub fn new(session_id: SessionId, step: impl Into<String>) -> Self {
        Self {
            session_id,
            thread_id: None,
            step: step.into(),
        }
    }

    pub fn with_thread(mut self, thread_id: ThreadId) -> Self {
        self.thread_id = Some(thread_id);
        self
    }
}

/// A complete structured result.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResult {
    pub schema: SchemaRef,
    pub payload: serde_json::Value,
}

impl StructuredResult {
    pub fn new(schema: SchemaRef, payload: serde_json::Value) -> Self {
        Self { schema, payload }
    }
}

/// One item of a streamed result.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub payload: serde_json::Value,
    pub is_final: bool,
}

impl PartialResult {
    pub fn partial(payload: serde_json::Value) -> Self {
        Self {
            payload,
            is_final: false,
        }
    }

    pub fn final_result(payload: serde_json::Value) -> Self {
        Self {
            payload,
            is_final: true,
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub model: String,
    pub supports_streaming: bool,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            supports_streaming: true,
        }
    }
}

/// Generation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Response could not be read as JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Response did not satisfy the requested schema.
    #[error("schema validation failed for {schema}: {reason}")]
    SchemaValidation { schema: SchemaRef, reason: String },

    /// Provider returned nothing usable.
    #[error("empty response")]
    EmptyResponse,

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl GenerationError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn schema_validation(schema: SchemaRef, reason: impl Into<String>) -> Self {
        Self::SchemaValidation {
            schema,
            reason: reason.into(),
        }
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited { .. }
                | GenerationError::Unavailable { .. }
                | GenerationError::Network(_)
                | GenerationError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> RequestMetadata {
        RequestMetadata::new(SessionId::new(), "collect_requirements")
    }

    #[test]
    fn generation_request_builder_works() {
        let request = GenerationRequest::new(SchemaRef::ProjectDetails, "extract slots", metadata())
            .with_history(vec![Message::user("hi"), Message::assistant("hello")])
            .with_deps(json!({"language": "en"}))
            .with_max_tokens(500)
            .with_temperature(0.2);

        assert_eq!(request.schema, SchemaRef::ProjectDetails);
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.deps["language"], "en");
        assert_eq!(request.max_tokens, Some(500));
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn turns_convert_to_messages() {
        let message: Message = ConversationTurn::user("grade 5").into();
        assert_eq!(message, Message::user("grade 5"));
    }

    #[test]
    fn partial_constructors_set_finality() {
        assert!(!PartialResult::partial(json!({})).is_final);
        assert!(PartialResult::final_result(json!({})).is_final);
    }

    #[test]
    fn generation_error_retryable_classification() {
        assert!(GenerationError::rate_limited(30).is_retryable());
        assert!(GenerationError::unavailable("down").is_retryable());
        assert!(GenerationError::network("reset").is_retryable());
        assert!(GenerationError::Timeout { timeout_secs: 30 }.is_retryable());

        assert!(!GenerationError::AuthenticationFailed.is_retryable());
        assert!(!GenerationError::EmptyResponse.is_retryable());
        assert!(!GenerationError::parse("bad json").is_retryable());
        assert!(!GenerationError::schema_validation(SchemaRef::ProjectOptions, "x").is_retryable());
    }

    #[test]
    fn message_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
