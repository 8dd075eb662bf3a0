use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::compliance::{summarize, ComplianceSummary};
use super::domain::{
    check_dates, AttachmentRef, DocumentError, DocumentId, DocumentStatus, DocumentType,
    DocumentTypeId, EmployeeDocument, EmployeeDocumentDraft, EmployeeId,
};
use super::repository::{DocumentQuery, DocumentRepository, DocumentTypeRepository};
use crate::context::RequestContext;
use crate::storage::RepositoryError;

/// Captured document as submitted by HR staff or an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployeeDocument {
    pub employee: EmployeeId,
    pub document_type: DocumentTypeId,
    /// Defaults to the document type name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub issue_place: Option<String>,
    #[serde(default)]
    pub issue_authority: Option<String>,
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Document with its status evaluated for a given day.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: EmployeeDocument,
    pub type_name: String,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

/// Service composing the catalog and document stores for capture and lookup.
pub struct DocumentRegistry<T, D> {
    types: Arc<T>,
    documents: Arc<D>,
}

impl<T, D> DocumentRegistry<T, D>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
{
    pub fn new(types: Arc<T>, documents: Arc<D>) -> Self {
        Self { types, documents }
    }

    /// Validate a new document against its type's policy and store it.
    pub fn capture(
        &self,
        ctx: &RequestContext,
        input: NewEmployeeDocument,
    ) -> Result<EmployeeDocument, DocumentError> {
        let document_type = self
            .types
            .fetch(input.document_type)?
            .ok_or(DocumentError::UnknownType(input.document_type))?;
        if !document_type.active {
            return Err(DocumentError::InactiveType(document_type.id));
        }

        if document_type.has_expiry && input.expiry_date.is_none() {
            return Err(DocumentError::RequiredField {
                field: "expiry_date",
            });
        }
        check_dates(input.issue_date, input.expiry_date)?;

        let name = input
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| document_type.name.clone());

        let stored = self.documents.insert(EmployeeDocumentDraft {
            employee: input.employee,
            document_type: document_type.id,
            name,
            number: input.number,
            issue_date: input.issue_date,
            expiry_date: input.expiry_date,
            issue_place: input.issue_place,
            issue_authority: input.issue_authority,
            attachment: input.attachment,
            notes: input.notes,
        })?;

        info!(
            user = %ctx.acting_user,
            document = %stored.id,
            employee = %stored.employee,
            document_type = %document_type.name,
            "employee document captured"
        );
        Ok(stored)
    }

    pub fn catalog(&self) -> Result<Vec<DocumentType>, RepositoryError> {
        self.types.list()
    }

    pub fn get(&self, id: DocumentId) -> Result<EmployeeDocument, DocumentError> {
        self.documents
            .fetch(id)?
            .ok_or(DocumentError::NotFound(id))
    }

    pub fn view(&self, id: DocumentId, today: NaiveDate) -> Result<DocumentView, DocumentError> {
        let document = self.get(id)?;
        self.describe(document, today)
    }

    pub fn list_for_employee(
        &self,
        employee: &EmployeeId,
        today: NaiveDate,
    ) -> Result<Vec<DocumentView>, DocumentError> {
        let mut documents = self
            .documents
            .find(&DocumentQuery::for_employee(employee.clone()))?;
        documents.sort_by(|a, b| {
            expiry_sort_key(a.expiry_date)
                .cmp(&expiry_sort_key(b.expiry_date))
                .then_with(|| b.id.cmp(&a.id))
        });
        documents
            .into_iter()
            .map(|document| self.describe(document, today))
            .collect()
    }

    /// Soft-delete: the row is kept and excluded from scans and summaries.
    pub fn deactivate(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
    ) -> Result<EmployeeDocument, DocumentError> {
        let document = self
            .documents
            .modify(id, |document| -> Result<(), DocumentError> {
                document.active = false;
                Ok(())
            })
            .map_err(|err| match err {
                DocumentError::Repository(RepositoryError::NotFound) => DocumentError::NotFound(id),
                other => other,
            })?;
        info!(user = %ctx.acting_user, document = %id, "employee document deactivated");
        Ok(document)
    }

    pub fn compliance(
        &self,
        employee: &EmployeeId,
        today: NaiveDate,
    ) -> Result<ComplianceSummary, DocumentError> {
        let documents = self
            .documents
            .find(&DocumentQuery::for_employee(employee.clone()))?;
        let catalog = self.types.list()?;
        Ok(summarize(employee, &documents, &catalog, today))
    }

    fn describe(
        &self,
        document: EmployeeDocument,
        today: NaiveDate,
    ) -> Result<DocumentView, DocumentError> {
        let document_type = self
            .types
            .fetch(document.document_type)?
            .ok_or(DocumentError::UnknownType(document.document_type))?;
        let days_remaining = document.days_remaining(today);
        let status = document.status(document_type.alert_days, today);
        Ok(DocumentView {
            document,
            type_name: document_type.name,
            status,
            days_remaining,
        })
    }
}

// Documents without an expiry sort after dated ones.
fn expiry_sort_key(expiry_date: Option<NaiveDate>) -> (bool, Option<NaiveDate>) {
    (expiry_date.is_none(), expiry_date)
}
