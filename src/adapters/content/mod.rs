//! Content adapters - Implementations of the ContentStore port.

mod static_catalog;

pub use static_catalog::StaticContentCatalog;
