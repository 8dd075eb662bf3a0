use std::sync::Arc;

use tracing::info;

use super::audit::{AuditError, AuditRecord, SignatureAuditTrail};
use super::domain::{
    NewSignatureRequest, NewSigner, SignatureAction, SignatureRequest, SignatureRequestId, Signer,
    SignerId,
};
use super::repository::SignatureStore;
use crate::context::RequestContext;
use crate::storage::RepositoryError;

/// Thin façade over the signing workflow's request and signer records, plus the audit trail.
pub struct SignatureService<S> {
    store: Arc<S>,
    trail: SignatureAuditTrail<S>,
}

impl<S> SignatureService<S>
where
    S: SignatureStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        let trail = SignatureAuditTrail::new(store.clone());
        Self { store, trail }
    }

    pub fn trail(&self) -> &SignatureAuditTrail<S> {
        &self.trail
    }

    /// Create a request and record its `created` entry.
    pub fn open_request(
        &self,
        ctx: &RequestContext,
        request: NewSignatureRequest,
    ) -> Result<SignatureRequest, AuditError> {
        let stored = self.store.create_request(request)?;
        self.trail.record(
            ctx,
            AuditRecord::new(stored.id, SignatureAction::Created)
                .description(format!("Signature request {} created", stored.reference)),
        )?;
        info!(user = %ctx.acting_user, request = %stored.id, "signature request opened");
        Ok(stored)
    }

    pub fn add_signer(
        &self,
        request: SignatureRequestId,
        signer: NewSigner,
    ) -> Result<Signer, AuditError> {
        self.store
            .add_signer(request, signer)
            .map_err(|err| match err {
                RepositoryError::NotFound => AuditError::Reference(request),
                other => other.into(),
            })
    }

    /// Delete a request; its signers and audit entries go with it.
    pub fn remove_request(
        &self,
        ctx: &RequestContext,
        request: SignatureRequestId,
    ) -> Result<(), AuditError> {
        self.store.delete_request(request).map_err(|err| match err {
            RepositoryError::NotFound => AuditError::Reference(request),
            other => other.into(),
        })?;
        info!(user = %ctx.acting_user, %request, "signature request deleted");
        Ok(())
    }

    /// Delete a signer; audit entries keep their place with the signer cleared.
    pub fn remove_signer(&self, ctx: &RequestContext, signer: SignerId) -> Result<(), AuditError> {
        self.store.delete_signer(signer)?;
        info!(user = %ctx.acting_user, %signer, "signer deleted");
        Ok(())
    }
}
