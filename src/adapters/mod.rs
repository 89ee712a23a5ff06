//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application core to external systems:
//! - `generation` - Generation clients (mock, Anthropic)
//! - `content` - Static template catalogue
//! - `documents` - Document stores (in-memory, YAML files)
//! - `checkpoints` - Conversation checkpoints
//! - `localization` - Preset string tables

pub mod checkpoints;
pub mod content;
pub mod documents;
pub mod generation;
pub mod localization;

pub use checkpoints::InMemoryCheckpointStore;
pub use content::StaticContentCatalog;
pub use documents::{FileDocumentStore, InMemoryDocumentStore};
pub use generation::{
    AnthropicConfig, AnthropicGenerationClient, MockError, MockGenerationClient, MockResponse,
};
pub use localization::PresetLocalizer;
