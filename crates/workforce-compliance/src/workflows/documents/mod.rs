//! Employee document records: the type catalog, capture, in-place renewal, expiry alerts,
//! compliance roll-ups, and bulk import.

pub mod alerts;
pub mod catalog;
pub(crate) mod compliance;
pub mod domain;
pub mod import;
pub mod renewal;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use alerts::{
    find_due, AlertError, AlertId, AlertLevel, AlertPriority, AlertState, DataIntegrityWarning,
    DueDocument, ExpiryAlert, ExpiryAlertScheduler, IntegrityIssue, ScanReport,
};
pub use catalog::{standard_catalog, CatalogService, DocumentTypePatch, NewDocumentType};
pub use compliance::{ComplianceStatus, ComplianceSummary, MandatoryGap};
pub use domain::{
    AttachmentRef, DocumentCategory, DocumentError, DocumentId, DocumentStatus, DocumentType,
    DocumentTypeId, EmployeeDocument, EmployeeId, DEFAULT_ALERT_DAYS,
};
pub use import::{DocumentImporter, ImportError, ImportFailure, ImportReport};
pub use renewal::{DocumentSelector, RenewalCompleted, RenewalEvent, RenewalWorkflow};
pub use repository::{AlertRepository, DocumentQuery, DocumentRepository, DocumentTypeRepository};
pub use router::document_router;
pub use service::{DocumentRegistry, DocumentView, NewEmployeeDocument};

/// The document services wired over one set of stores.
pub struct DocumentServices<T, D, A> {
    pub catalog: CatalogService<T>,
    pub registry: DocumentRegistry<T, D>,
    pub renewal: RenewalWorkflow<D>,
    pub alerts: Arc<ExpiryAlertScheduler<T, D, A>>,
}

impl<T, D, A> DocumentServices<T, D, A>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    pub fn new(types: Arc<T>, documents: Arc<D>, alerts: Arc<A>, default_alert_days: u32) -> Self {
        Self {
            catalog: CatalogService::with_default_alert_days(types.clone(), default_alert_days),
            registry: DocumentRegistry::new(types.clone(), documents.clone()),
            renewal: RenewalWorkflow::new(documents.clone()),
            alerts: Arc::new(ExpiryAlertScheduler::new(types, documents, alerts)),
        }
    }
}
