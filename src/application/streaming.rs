//! Aggregation of partial generation results into incremental text.
//!
//! Partial payloads carry the whole value generated so far. The preview
//! field of each partial is diffed against what was already emitted so
//! only the new suffix goes out, and emission is debounced so volume stays
//! bounded. The final update is never debounced away.

use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::time::Instant;

use crate::ports::{GenerationError, PartialStream};

/// Tracks emitted text and yields only what is new.
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    emitted: String,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suffix of `current` past its longest common prefix with the text
    /// already emitted.
    ///
    /// Whitespace-only deltas are held back until real text follows.
    pub fn advance(&mut self, current: &str) -> Option<String> {
        let common = common_prefix_len(&self.emitted, current);
        let delta = &current[common..];
        if delta.trim().is_empty() {
            return None;
        }
        let delta = delta.to_string();
        self.emitted = current.to_string();
        Some(delta)
    }

    pub fn emitted(&self) -> &str {
        &self.emitted
    }

    pub fn into_text(self) -> String {
        self.emitted
    }
}

/// Byte length of the longest common prefix, on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// Lets at most one update through per interval.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True when an update at `now` may be emitted.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Final payload of a consumed stream plus the preview text emitted for it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamedPayload {
    pub payload: Value,
    pub streamed_text: String,
}

/// Consumes `stream`, calling `on_delta` with each new piece of the
/// preview field.
///
/// The final item wins. A stream that ends without a final item yields the
/// last partial received; one that yields nothing is an empty response.
/// An error item ends consumption with that error.
pub async fn collect_stream<F>(
    mut stream: PartialStream,
    preview_field: Option<&str>,
    debounce: Duration,
    mut on_delta: F,
) -> Result<StreamedPayload, GenerationError>
where
    F: FnMut(String),
{
    let mut tracker = DeltaTracker::new();
    let mut debouncer = Debouncer::new(debounce);
    let mut last_partial: Option<Value> = None;

    while let Some(item) = stream.next().await {
        let partial = item?;
        if partial.is_final {
            flush(&mut tracker, preview_field, &partial.payload, &mut on_delta);
            return Ok(StreamedPayload {
                payload: partial.payload,
                streamed_text: tracker.into_text(),
            });
        }
        if debouncer.ready(Instant::now()) {
            flush(&mut tracker, preview_field, &partial.payload, &mut on_delta);
        }
        last_partial = Some(partial.payload);
    }

    let payload = last_partial.ok_or(GenerationError::EmptyResponse)?;
    flush(&mut tracker, preview_field, &payload, &mut on_delta);
    Ok(StreamedPayload {
        payload,
        streamed_text: tracker.into_text(),
    })
}

fn flush<F: FnMut(String)>(
    tracker: &mut DeltaTracker,
    preview_field: Option<&str>,
    payload: &Value,
    on_delta: &mut F,
) {
    let text = preview_field
        .and_then(|field| payload.get(field))
        .and_then(Value::as_str);
    if let Some(delta) = text.and_then(|t| tracker.advance(t)) {
        on_delta(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PartialResult;
    use futures::stream;
    use serde_json::json;

    fn stream_of(items: Vec<Result<PartialResult, GenerationError>>) -> PartialStream {
        Box::pin(stream::iter(items))
    }

    fn partial(text: &str) -> Result<PartialResult, GenerationError> {
        Ok(PartialResult::partial(json!({ "response": text })))
    }

    #[test]
    fn tracker_emits_only_new_suffix() {
        let mut tracker = DeltaTracker::new();

        assert_eq!(tracker.advance("Hello").as_deref(), Some("Hello"));
        assert_eq!(tracker.advance("Hello wor").as_deref(), Some(" wor"));
        assert_eq!(tracker.advance("Hello wor"), None);
        assert_eq!(tracker.emitted(), "Hello wor");
    }

    #[test]
    fn tracker_holds_back_whitespace() {
        let mut tracker = DeltaTracker::new();
        tracker.advance("Hi");

        assert_eq!(tracker.advance("Hi  "), None);
        assert_eq!(tracker.advance("Hi  there").as_deref(), Some("  there"));
    }

    #[test]
    fn tracker_diffs_against_common_prefix_when_text_is_rewritten() {
        let mut tracker = DeltaTracker::new();
        tracker.advance("The solar sys");

        assert_eq!(
            tracker.advance("The solar system").as_deref(),
            Some("tem")
        );
        assert_eq!(tracker.advance("The planets").as_deref(), Some("planets"));
    }

    #[test]
    fn common_prefix_respects_char_boundaries() {
        assert_eq!(common_prefix_len("café", "cafè"), 3);
        assert_eq!(common_prefix_len("ñandú", "ñandú y"), "ñandú".len());
    }

    #[test]
    fn debouncer_limits_rate() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        assert!(debouncer.ready(start));
        assert!(!debouncer.ready(start + Duration::from_millis(5)));
        assert!(debouncer.ready(start + Duration::from_millis(10)));
    }

    #[test]
    fn zero_interval_never_blocks() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::ZERO);
        assert!(debouncer.ready(start));
        assert!(debouncer.ready(start));
    }

    #[tokio::test]
    async fn final_update_is_never_debounced() {
        let items = vec![
            partial("Great"),
            partial("Great, a"),
            partial("Great, a solar"),
            Ok(PartialResult::final_result(
                json!({ "response": "Great, a solar system project!" }),
            )),
        ];
        let mut deltas = Vec::new();

        let out = collect_stream(
            stream_of(items),
            Some("response"),
            Duration::from_secs(3600),
            |d| deltas.push(d),
        )
        .await
        .unwrap();

        assert_eq!(deltas.concat(), "Great, a solar system project!");
        assert_eq!(deltas.first().map(String::as_str), Some("Great"));
        assert_eq!(out.streamed_text, "Great, a solar system project!");
    }

    #[tokio::test]
    async fn deltas_concatenate_to_final_text() {
        let items = vec![
            partial("One"),
            partial("One two"),
            Ok(PartialResult::final_result(json!({ "response": "One two three" }))),
        ];
        let mut deltas = Vec::new();

        collect_stream(stream_of(items), Some("response"), Duration::ZERO, |d| {
            deltas.push(d)
        })
        .await
        .unwrap();

        assert_eq!(deltas, vec!["One", " two", " three"]);
    }

    #[tokio::test]
    async fn stream_without_final_uses_last_partial() {
        let items = vec![partial("a"), partial("ab")];

        let out = collect_stream(stream_of(items), Some("response"), Duration::ZERO, |_| {})
            .await
            .unwrap();

        assert_eq!(out.payload, json!({ "response": "ab" }));
    }

    #[tokio::test]
    async fn empty_stream_is_empty_response() {
        let err = collect_stream(stream_of(vec![]), None, Duration::ZERO, |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::EmptyResponse);
    }

    #[tokio::test]
    async fn error_item_ends_consumption() {
        let items = vec![
            partial("half"),
            Err(GenerationError::network("reset")),
            partial("never seen"),
        ];

        let err = collect_stream(stream_of(items), Some("response"), Duration::ZERO, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::network("reset"));
    }

    #[tokio::test]
    async fn payload_without_preview_field_emits_nothing() {
        let items = vec![Ok(PartialResult::final_result(json!({ "standards": [] })))];
        let mut calls = 0;

        collect_stream(stream_of(items), Some("response"), Duration::ZERO, |_| calls += 1)
            .await
            .unwrap();

        assert_eq!(calls, 0);
    }
}
