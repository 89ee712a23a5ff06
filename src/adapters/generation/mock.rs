//! Mock Generation Client for testing and offline runs.
//!
//! Responses are scripted per schema, so a test can queue exactly what each
//! pipeline step will receive regardless of call order between steps.
//!
//! # Features
//!
//! - Per-schema response queues, consumed in order
//! - Sticky per-schema defaults once a queue runs dry
//! - Scripted partial payloads and mid-stream failures
//! - Error injection for fallback testing
//! - Simulated latency and call tracking
//!
//! # Example
//!
//! ```ignore
//! let client = MockGenerationClient::new()
//!     .with_payload(SchemaRef::ProjectDetails, json!({"topic": "bees"}))
//!     .with_error(SchemaRef::StandardsAlignment, MockError::unavailable("down"));
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::planning::SchemaRef;
use crate::ports::{
    ClientInfo, GenerationClient, GenerationError, GenerationRequest, PartialResult,
    PartialStream, StructuredResult,
};

/// A scripted answer for one call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return the payload. Streaming derives partials from its preview field.
    Payload(Value),
    /// Stream the given partials, then the payload as final.
    Streamed { partials: Vec<Value>, payload: Value },
    /// Stream the given partials, then fail.
    BrokenStream { partials: Vec<Value>, error: MockError },
    /// Fail the call.
    Error(MockError),
}

/// Mock error types for testing fallbacks.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Parse { message: String },
    SchemaValidation { reason: String },
    Empty,
    Timeout { timeout_secs: u32 },
}

impl MockError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        MockError::Unavailable {
            message: message.into(),
        }
    }

    pub fn schema_validation(reason: impl Into<String>) -> Self {
        MockError::SchemaValidation {
            reason: reason.into(),
        }
    }

    fn into_error(self, schema: SchemaRef) -> GenerationError {
        match self {
            MockError::RateLimited { retry_after_secs } => {
                GenerationError::rate_limited(retry_after_secs)
            }
            MockError::Unavailable { message } => GenerationError::unavailable(message),
            MockError::AuthenticationFailed => GenerationError::AuthenticationFailed,
            MockError::Network { message } => GenerationError::network(message),
            MockError::Parse { message } => GenerationError::parse(message),
            MockError::SchemaValidation { reason } => {
                GenerationError::schema_validation(schema, reason)
            }
            MockError::Empty => GenerationError::EmptyResponse,
            MockError::Timeout { timeout_secs } => GenerationError::Timeout { timeout_secs },
        }
    }
}

/// Mock generation client.
///
/// Clones share queues and call history, so a test can keep a handle while
/// the pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct MockGenerationClient {
    responses: Arc<Mutex<HashMap<SchemaRef, VecDeque<MockResponse>>>>,
    defaults: Arc<Mutex<HashMap<SchemaRef, MockResponse>>>,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
    delay: Duration,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockGenerationClient {
    /// Creates a client with no scripted responses.
    ///
    /// Unscripted calls fail with `EmptyResponse`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for `schema`.
    pub fn with_response(self, schema: SchemaRef, response: MockResponse) -> Self {
        self.push(schema, response);
        self
    }

    /// Queues a payload for `schema`.
    pub fn with_payload(self, schema: SchemaRef, payload: Value) -> Self {
        self.with_response(schema, MockResponse::Payload(payload))
    }

    /// Queues an error for `schema`.
    pub fn with_error(self, schema: SchemaRef, error: MockError) -> Self {
        self.with_response(schema, MockResponse::Error(error))
    }

    /// Response returned for `schema` whenever its queue is empty.
    pub fn with_default(self, schema: SchemaRef, response: MockResponse) -> Self {
        locked(&self.defaults).insert(schema, response);
        self
    }

    /// Simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a response on an already shared client.
    pub fn push(&self, schema: SchemaRef, response: MockResponse) {
        locked(&self.responses)
            .entry(schema)
            .or_default()
            .push_back(response);
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    /// Number of calls made for one schema.
    pub fn calls_for(&self, schema: SchemaRef) -> usize {
        locked(&self.calls)
            .iter()
            .filter(|call| call.schema == schema)
            .count()
    }

    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        locked(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        locked(&self.calls).clear();
    }

    fn next_response(&self, schema: SchemaRef) -> MockResponse {
        let queued = locked(&self.responses)
            .get_mut(&schema)
            .and_then(VecDeque::pop_front);
        queued
            .or_else(|| locked(&self.defaults).get(&schema).cloned())
            .unwrap_or(MockResponse::Error(MockError::Empty))
    }

    async fn begin(&self, request: GenerationRequest) -> MockResponse {
        let schema = request.schema;
        locked(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.next_response(schema)
    }
}

/// Growing prefixes of the preview field, one per word.
fn preview_partials(schema: SchemaRef, payload: &Value) -> Vec<Value> {
    let Some(field) = schema.preview_field() else {
        return Vec::new();
    };
    let Some(text) = payload.get(field).and_then(Value::as_str) else {
        return Vec::new();
    };

    let words: Vec<&str> = text.split_whitespace().collect();
    (1..words.len())
        .map(|n| {
            let mut partial = serde_json::Map::new();
            partial.insert(field.to_string(), Value::String(words[..n].join(" ")));
            Value::Object(partial)
        })
        .collect()
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<StructuredResult, GenerationError> {
        let schema = request.schema;
        match self.begin(request).await {
            MockResponse::Payload(payload) | MockResponse::Streamed { payload, .. } => {
                Ok(StructuredResult::new(schema, payload))
            }
            MockResponse::BrokenStream { error, .. } | MockResponse::Error(error) => {
                Err(error.into_error(schema))
            }
        }
    }

    async fn stream_generate(
        &self,
        request: GenerationRequest,
    ) -> Result<PartialStream, GenerationError> {
        let schema = request.schema;
        let (partials, last) = match self.begin(request).await {
            MockResponse::Payload(payload) => {
                (preview_partials(schema, &payload), Ok(payload))
            }
            MockResponse::Streamed { partials, payload } => (partials, Ok(payload)),
            MockResponse::BrokenStream { partials, error } => {
                (partials, Err(error.into_error(schema)))
            }
            MockResponse::Error(error) => return Err(error.into_error(schema)),
        };

        let partials = stream::iter(partials.into_iter().map(|p| Ok(PartialResult::partial(p))));
        let last = stream::once(async move { last.map(PartialResult::final_result) });
        Ok(Box::pin(partials.chain(last)))
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo::new("mock", "mock-model")
    }
}
