//! E-signature audit trail: an append-only record of the lifecycle events reported by the
//! signing workflow.

pub mod audit;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use audit::{lifecycle_violations, AuditError, AuditRecord, LifecycleViolation, SignatureAuditTrail};
pub use domain::{
    AuditEntryId, NewSignatureRequest, NewSigner, SignatureAction, SignatureAuditEntry,
    SignatureRequest, SignatureRequestId, Signer, SignerId,
};
pub use repository::SignatureStore;
pub use router::signature_router;
pub use service::SignatureService;
