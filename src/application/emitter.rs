//! Ordered side channel for progress text.
//!
//! One run has exactly one producer (the step currently executing) and one
//! consumer (whoever started the run). Text arrives in emission order.

use tokio::sync::mpsc;
use tracing::trace;

/// Producer half handed to steps.
#[derive(Debug, Clone)]
pub struct Emitter {
    sender: mpsc::UnboundedSender<String>,
}

/// Consumer half kept by the caller of a run.
#[derive(Debug)]
pub struct EmissionReceiver {
    receiver: mpsc::UnboundedReceiver<String>,
}

impl Emitter {
    /// Creates a connected emitter/receiver pair.
    pub fn channel() -> (Emitter, EmissionReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Emitter { sender }, EmissionReceiver { receiver })
    }

    /// Emits `text`. Empty text is dropped.
    ///
    /// A receiver that went away is not an error for the producer; the run
    /// carries on and the text is discarded.
    pub fn emit(&self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if self.sender.send(text).is_err() {
            trace!("emission receiver dropped; discarding text");
        }
    }
}

impl EmissionReceiver {
    /// Waits for the next emission. `None` once every emitter is dropped.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Everything emitted so far, in order, without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = self.receiver.try_recv() {
            out.push(text);
        }
        out
    }

    /// Drained emissions joined into one string.
    pub fn drain_text(&mut self) -> String {
        self.drain().concat()
    }
}
