use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    check_dates, AttachmentRef, DocumentError, DocumentId, DocumentTypeId, EmployeeDocument,
    EmployeeId,
};
use super::repository::{DocumentQuery, DocumentRepository};
use crate::context::RequestContext;

pub const RENEWAL_NOTES_SEPARATOR: &str = "\n\nRenewal Notes: ";

/// How the renewal target is chosen. Resolution must yield exactly one active document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSelector {
    Ids(Vec<DocumentId>),
    EmployeeType {
        employee: EmployeeId,
        document_type: DocumentTypeId,
    },
}

impl DocumentSelector {
    pub fn single(id: DocumentId) -> Self {
        Self::Ids(vec![id])
    }

    fn query(&self) -> DocumentQuery {
        match self {
            Self::Ids(ids) => {
                let unique: BTreeSet<DocumentId> = ids.iter().copied().collect();
                DocumentQuery {
                    ids: Some(unique.into_iter().collect()),
                    ..DocumentQuery::default()
                }
            }
            Self::EmployeeType {
                employee,
                document_type,
            } => DocumentQuery {
                employee: Some(employee.clone()),
                document_type: Some(*document_type),
                ..DocumentQuery::default()
            },
        }
    }
}

/// Renewal payload. Only `new_expiry_date` is mandatory; other fields patch when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalEvent {
    #[serde(default)]
    pub new_number: Option<String>,
    #[serde(default)]
    pub new_issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub new_expiry_date: Option<NaiveDate>,
    /// Blob key of the replacement attachment.
    #[serde(default)]
    pub new_attachment: Option<String>,
    #[serde(default)]
    pub new_attachment_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Completion signal; the renewal returns no further data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalCompleted;

/// In-place renewal of an employee document.
pub struct RenewalWorkflow<D> {
    documents: Arc<D>,
}

impl<D> RenewalWorkflow<D>
where
    D: DocumentRepository + 'static,
{
    pub fn new(documents: Arc<D>) -> Self {
        Self { documents }
    }

    pub fn renew(
        &self,
        ctx: &RequestContext,
        target: &DocumentSelector,
        event: RenewalEvent,
    ) -> Result<RenewalCompleted, DocumentError> {
        let candidates = self.documents.find(&target.query())?;
        if candidates.len() != 1 {
            return Err(DocumentError::TargetCount {
                found: candidates.len(),
            });
        }

        let new_expiry_date = event.new_expiry_date.ok_or(DocumentError::RequiredField {
            field: "new_expiry_date",
        })?;

        // Patched under the store lock; a concurrent renewal appends to the latest notes.
        let document = self.documents.modify(candidates[0].id, |document| {
            if !document.active {
                return Err(DocumentError::TargetCount { found: 0 });
            }
            apply_renewal(document, new_expiry_date, event);
            check_dates(document.issue_date, document.expiry_date)
        })?;
        info!(
            user = %ctx.acting_user,
            document = %document.id,
            expiry_date = %new_expiry_date,
            "employee document renewed"
        );
        Ok(RenewalCompleted)
    }
}

/// Merge-patch the renewal onto the document and append any notes.
pub fn apply_renewal(document: &mut EmployeeDocument, new_expiry_date: NaiveDate, event: RenewalEvent) {
    document.expiry_date = Some(new_expiry_date);

    if let Some(number) = present(event.new_number) {
        document.number = Some(number);
    }
    if let Some(issue_date) = event.new_issue_date {
        document.issue_date = Some(issue_date);
    }
    if let Some(blob_key) = present(event.new_attachment) {
        let filename = present(event.new_attachment_name);
        if filename.is_none() {
            warn!(document = %document.id, "renewal attachment supplied without a filename");
        }
        document.attachment = Some(AttachmentRef { blob_key, filename });
    }
    if let Some(notes) = present(event.notes) {
        let mut combined = document.notes.take().unwrap_or_default();
        combined.push_str(RENEWAL_NOTES_SEPARATOR);
        combined.push_str(&notes);
        document.notes = Some(combined);
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
