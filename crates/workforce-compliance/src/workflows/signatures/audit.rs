use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{
    AuditEntryDraft, AuditEntryId, SignatureAction, SignatureAuditEntry, SignatureRequestId,
    SignerId,
};
use super::repository::SignatureStore;
use crate::context::RequestContext;
use crate::storage::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit entry references unknown {0}")]
    Reference(SignatureRequestId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Event reported by the signing workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub request: SignatureRequestId,
    #[serde(default)]
    pub signer: Option<SignerId>,
    pub action: SignatureAction,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl AuditRecord {
    pub fn new(request: SignatureRequestId, action: SignatureAction) -> Self {
        Self {
            request,
            signer: None,
            action,
            description: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn signer(mut self, signer: SignerId) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn client(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Append-only log of signature lifecycle events.
pub struct SignatureAuditTrail<S> {
    store: Arc<S>,
}

impl<S> SignatureAuditTrail<S>
where
    S: SignatureStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append one entry stamped with the context's user and clock.
    ///
    /// A signer that is unknown or belongs to another request is recorded as no signer;
    /// an unknown request is rejected.
    pub fn record(
        &self,
        ctx: &RequestContext,
        record: AuditRecord,
    ) -> Result<SignatureAuditEntry, AuditError> {
        if self.store.fetch_request(record.request)?.is_none() {
            return Err(AuditError::Reference(record.request));
        }

        let signer = match record.signer {
            Some(signer) => match self.store.fetch_signer(signer)? {
                Some(found) if found.request == record.request => Some(signer),
                Some(found) => {
                    warn!(
                        request = %record.request,
                        %signer,
                        signer_request = %found.request,
                        "audit entry names a signer of another request"
                    );
                    None
                }
                None => {
                    warn!(request = %record.request, %signer, "audit entry names a missing signer");
                    None
                }
            },
            None => None,
        };

        let draft = AuditEntryDraft {
            request: record.request,
            signer,
            timestamp: ctx.now,
            action: record.action,
            description: record.description,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
            acting_user: ctx.acting_user.clone(),
        };

        match self.store.append_entry(draft) {
            Ok(entry) => {
                debug!(
                    request = %entry.request,
                    action = entry.action.label(),
                    "signature audit entry recorded"
                );
                Ok(entry)
            }
            // The request was removed between the lookup and the append.
            Err(RepositoryError::NotFound) => Err(AuditError::Reference(record.request)),
            Err(err) => Err(err.into()),
        }
    }

    /// Entries for a request, most recent first; equal timestamps list the later insert first.
    pub fn entries_for(
        &self,
        request: SignatureRequestId,
    ) -> Result<Vec<SignatureAuditEntry>, AuditError> {
        let mut entries = self.store.entries(request)?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        Ok(entries)
    }
}

/// A non-reset action reported after the request reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleViolation {
    pub entry: AuditEntryId,
    pub terminal: SignatureAction,
    pub action: SignatureAction,
}

/// Check a request's entries (in any order) for actions following a terminal action.
pub fn lifecycle_violations(entries: &[SignatureAuditEntry]) -> Vec<LifecycleViolation> {
    let mut chronological: Vec<&SignatureAuditEntry> = entries.iter().collect();
    chronological.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let mut terminal: Option<SignatureAction> = None;
    let mut violations = Vec::new();
    for entry in chronological {
        match (terminal, entry.action) {
            (_, SignatureAction::Reset) => terminal = None,
            (Some(reached), action) => violations.push(LifecycleViolation {
                entry: entry.id,
                terminal: reached,
                action,
            }),
            (None, action) if action.is_terminal() => terminal = Some(action),
            (None, _) => {}
        }
    }
    violations
}
