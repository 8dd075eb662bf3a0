use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignatureRequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignerId(pub u64);

/// Insertion-ordered identifier; later entries always carry larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuditEntryId(pub u64);

impl fmt::Display for SignatureRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signature-request-{}", self.0)
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signer-{}", self.0)
    }
}

/// Minimal view of a request owned by the external signing workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRequest {
    pub id: SignatureRequestId,
    pub reference: String,
    pub document_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSignatureRequest {
    pub reference: String,
    pub document_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub id: SignerId,
    pub request: SignatureRequestId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSigner {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureAction {
    Created,
    Sent,
    Viewed,
    Signed,
    Declined,
    Reminder,
    Completed,
    Cancelled,
    Expired,
    Reset,
}

impl SignatureAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Sent => "Sent",
            Self::Viewed => "Viewed",
            Self::Signed => "Signed",
            Self::Declined => "Declined",
            Self::Reminder => "Reminder Sent",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
            Self::Reset => "Reset to Draft",
        }
    }

    /// Actions after which only `Reset` may follow.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Declined | Self::Cancelled | Self::Expired
        )
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureAuditEntry {
    pub id: AuditEntryId,
    pub request: SignatureRequestId,
    /// Cleared when the signer is deleted.
    pub signer: Option<SignerId>,
    pub timestamp: DateTime<Utc>,
    pub action: SignatureAction,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub acting_user: UserId,
}

impl SignatureAuditEntry {
    pub fn new(id: AuditEntryId, draft: AuditEntryDraft) -> Self {
        Self {
            id,
            request: draft.request,
            signer: draft.signer,
            timestamp: draft.timestamp,
            action: draft.action,
            description: draft.description,
            ip_address: draft.ip_address,
            user_agent: draft.user_agent,
            acting_user: draft.acting_user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntryDraft {
    pub request: SignatureRequestId,
    pub signer: Option<SignerId>,
    pub timestamp: DateTime<Utc>,
    pub action: SignatureAction,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub acting_user: UserId,
}
