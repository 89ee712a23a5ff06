//! Generation adapters - Implementations of the GenerationClient port.
//!
//! - `MockGenerationClient` - Scripted responses for tests and offline runs
//! - `AnthropicGenerationClient` - Claude Messages API over HTTP

mod anthropic;
mod demo;
mod json_repair;
mod mock;

pub use anthropic::{AnthropicConfig, AnthropicGenerationClient};
pub use demo::demo_payload;
pub use json_repair::{extract_json, repair_partial};
pub use mock::{MockError, MockGenerationClient, MockResponse};
