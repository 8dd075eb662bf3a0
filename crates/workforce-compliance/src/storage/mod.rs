//! Persistence seam shared by the document and signature workflows.
//!
//! The workflows only depend on the store traits declared next to them; this module
//! carries the common error type and the in-memory stores used by the service and tests.

pub mod memory;

pub use memory::{InMemoryAlertStore, InMemoryCatalog, InMemoryDocumentStore, InMemorySignatureStore};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
