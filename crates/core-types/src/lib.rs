pub mod document;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use document::{Document, DocumentId};
pub use error::CoreError;
pub use structs::{Cliente, Customer};
