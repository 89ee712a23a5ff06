//! Ports - Interfaces for external dependencies.
//!
//! Ports define the contracts between the application core and the
//! outside world. Adapters implement these traits.

mod checkpoint_store;
mod content_store;
mod document_store;
mod generation_client;
mod localizer;

pub use checkpoint_store::{CheckpointError, CheckpointStore};
pub use content_store::ContentStore;
pub use document_store::{DocumentStore, DocumentStoreError};
pub use generation_client::{
    ClientInfo, GenerationClient, GenerationError, GenerationRequest, Message, MessageRole,
    PartialResult, PartialStream, RequestMetadata, StructuredResult,
};
pub use localizer::Localizer;
