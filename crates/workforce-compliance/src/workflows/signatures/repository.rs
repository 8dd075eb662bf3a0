use super::domain::{
    AuditEntryDraft, NewSignatureRequest, NewSigner, SignatureAuditEntry, SignatureRequest,
    SignatureRequestId, Signer, SignerId,
};
use crate::storage::RepositoryError;

/// Storage for signature requests, their signers, and the audit log.
///
/// Audit entries have no update or delete operation. Deleting a
/// request removes its signers and entries; deleting a signer clears it from its entries.
pub trait SignatureStore: Send + Sync {
    fn create_request(
        &self,
        request: NewSignatureRequest,
    ) -> Result<SignatureRequest, RepositoryError>;
    fn fetch_request(
        &self,
        id: SignatureRequestId,
    ) -> Result<Option<SignatureRequest>, RepositoryError>;
    fn delete_request(&self, id: SignatureRequestId) -> Result<(), RepositoryError>;

    /// Fails with `NotFound` when the request does not exist.
    fn add_signer(
        &self,
        request: SignatureRequestId,
        signer: NewSigner,
    ) -> Result<Signer, RepositoryError>;
    fn fetch_signer(&self, id: SignerId) -> Result<Option<Signer>, RepositoryError>;
    fn delete_signer(&self, id: SignerId) -> Result<(), RepositoryError>;

    /// Append an entry. Fails with `NotFound` when the request no longer exists.
    fn append_entry(&self, entry: AuditEntryDraft) -> Result<SignatureAuditEntry, RepositoryError>;
    /// Entries for a request in insertion order.
    fn entries(
        &self,
        request: SignatureRequestId,
    ) -> Result<Vec<SignatureAuditEntry>, RepositoryError>;
}
