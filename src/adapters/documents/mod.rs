//! Document store adapters.
//!
//! - `InMemoryDocumentStore` - Process-local, used by tests and the CLI default
//! - `FileDocumentStore` - One YAML file per document

mod file;
mod in_memory;

pub use file::FileDocumentStore;
pub use in_memory::InMemoryDocumentStore;
