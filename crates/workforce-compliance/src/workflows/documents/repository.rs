use chrono::NaiveDate;

use super::alerts::{AlertId, ExpiryAlert, ExpiryAlertDraft};
use super::domain::{
    DocumentId, DocumentType, DocumentTypeDraft, DocumentTypeId, EmployeeDocument,
    EmployeeDocumentDraft, EmployeeId,
};
use crate::storage::RepositoryError;

/// Catalog storage. Type names are unique across active and inactive entries, compared
/// ignoring ASCII case and surrounding whitespace.
pub trait DocumentTypeRepository: Send + Sync {
    fn insert(&self, draft: DocumentTypeDraft) -> Result<DocumentType, RepositoryError>;
    fn update(&self, document_type: DocumentType) -> Result<(), RepositoryError>;
    fn fetch(&self, id: DocumentTypeId) -> Result<Option<DocumentType>, RepositoryError>;
    /// Every entry, ordered by `(sequence, name)`.
    fn list(&self) -> Result<Vec<DocumentType>, RepositoryError>;
}

/// Employee document storage. Rows are never removed, only deactivated.
pub trait DocumentRepository: Send + Sync {
    fn insert(&self, draft: EmployeeDocumentDraft) -> Result<EmployeeDocument, RepositoryError>;
    /// Apply `change` to the stored row under one write. Nothing is stored when it fails.
    fn modify<F, E>(&self, id: DocumentId, change: F) -> Result<EmployeeDocument, E>
    where
        F: FnOnce(&mut EmployeeDocument) -> Result<(), E>,
        E: From<RepositoryError>;
    fn fetch(&self, id: DocumentId) -> Result<Option<EmployeeDocument>, RepositoryError>;
    fn find(&self, query: &DocumentQuery) -> Result<Vec<EmployeeDocument>, RepositoryError>;
    /// Consistent copy of every active document, taken under a single read.
    fn active_snapshot(&self) -> Result<Vec<EmployeeDocument>, RepositoryError>;
}

/// Expiry alert storage, keyed by `(document, expiry_date)`.
pub trait AlertRepository: Send + Sync {
    /// Fails with `Conflict` when an alert already exists for the same document and expiry date.
    fn insert(&self, draft: ExpiryAlertDraft) -> Result<ExpiryAlert, RepositoryError>;
    fn update(&self, alert: ExpiryAlert) -> Result<(), RepositoryError>;
    fn fetch(&self, id: AlertId) -> Result<Option<ExpiryAlert>, RepositoryError>;
    fn find_for(
        &self,
        document: DocumentId,
        expiry_date: NaiveDate,
    ) -> Result<Option<ExpiryAlert>, RepositoryError>;
    fn list(&self) -> Result<Vec<ExpiryAlert>, RepositoryError>;
}

/// Filter used to resolve documents; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    pub ids: Option<Vec<DocumentId>>,
    pub employee: Option<EmployeeId>,
    pub document_type: Option<DocumentTypeId>,
    pub include_inactive: bool,
}

impl DocumentQuery {
    pub fn for_employee(employee: EmployeeId) -> Self {
        Self {
            employee: Some(employee),
            ..Self::default()
        }
    }

    pub fn matches(&self, document: &EmployeeDocument) -> bool {
        if !self.include_inactive && !document.active {
            return false;
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&document.id) {
                return false;
            }
        }
        if let Some(employee) = &self.employee {
            if &document.employee != employee {
                return false;
            }
        }
        if let Some(document_type) = self.document_type {
            if document.document_type != document_type {
                return false;
            }
        }
        true
    }
}
