use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::context::RequestContext;
use crate::storage::{InMemoryAlertStore, InMemoryCatalog, InMemoryDocumentStore, RepositoryError};
use crate::workflows::documents::alerts::{AlertId, ExpiryAlert, ExpiryAlertDraft};
use crate::workflows::documents::domain::{DocumentId, DocumentType, EmployeeDocument, EmployeeId};
use crate::workflows::documents::repository::{
    AlertRepository, DocumentRepository, DocumentTypeRepository,
};
use crate::workflows::documents::{DocumentServices, NewDocumentType, NewEmployeeDocument};

pub(super) type MemoryServices =
    DocumentServices<InMemoryCatalog, InMemoryDocumentStore, InMemoryAlertStore>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2025, 6, 1)
}

pub(super) fn ctx() -> RequestContext {
    RequestContext::at(
        "hr.officer",
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    )
}

pub(super) fn ctx_on(day: NaiveDate) -> RequestContext {
    ctx().as_of(day)
}

pub(super) fn build_services() -> (
    Arc<MemoryServices>,
    Arc<InMemoryDocumentStore>,
    Arc<InMemoryAlertStore>,
) {
    let documents = Arc::new(InMemoryDocumentStore::default());
    let alerts = Arc::new(InMemoryAlertStore::default());
    let services = Arc::new(DocumentServices::new(
        Arc::new(InMemoryCatalog::default()),
        documents.clone(),
        alerts.clone(),
        30,
    ));
    (services, documents, alerts)
}

pub(super) fn document_type_input(name: &str, sequence: i32, alert_days: u32) -> NewDocumentType {
    NewDocumentType {
        name: name.to_string(),
        sequence: Some(sequence),
        has_expiry: Some(true),
        alert_days: Some(alert_days),
        ..NewDocumentType::default()
    }
}

pub(super) fn register_type<T, D, A>(
    services: &DocumentServices<T, D, A>,
    name: &str,
    sequence: i32,
    alert_days: u32,
) -> DocumentType
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    services
        .catalog
        .register(&ctx(), document_type_input(name, sequence, alert_days))
        .expect("type registers")
}

pub(super) fn document_input(
    employee: &str,
    document_type: &DocumentType,
    expiry_date: Option<NaiveDate>,
) -> NewEmployeeDocument {
    NewEmployeeDocument {
        employee: EmployeeId(employee.to_string()),
        document_type: document_type.id,
        name: None,
        number: Some("123".to_string()),
        issue_date: Some(date(2020, 1, 1)),
        expiry_date,
        issue_place: None,
        issue_authority: None,
        attachment: None,
        notes: None,
    }
}

pub(super) fn capture<T, D, A>(
    services: &DocumentServices<T, D, A>,
    employee: &str,
    document_type: &DocumentType,
    expiry_date: Option<NaiveDate>,
) -> EmployeeDocument
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    services
        .registry
        .capture(&ctx(), document_input(employee, document_type, expiry_date))
        .expect("document captured")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Alert store that refuses inserts for one document and delegates the rest.
#[derive(Default, Clone)]
pub(super) struct FlakyAlerts {
    inner: InMemoryAlertStore,
    failing: Arc<Mutex<Option<DocumentId>>>,
}

impl FlakyAlerts {
    pub(super) fn fail_for(&self, document: DocumentId) {
        *self.failing.lock().expect("flaky mutex poisoned") = Some(document);
    }
}

impl AlertRepository for FlakyAlerts {
    fn insert(&self, draft: ExpiryAlertDraft) -> Result<ExpiryAlert, RepositoryError> {
        if *self.failing.lock().expect("flaky mutex poisoned") == Some(draft.document) {
            return Err(RepositoryError::Unavailable("alert store offline".to_string()));
        }
        self.inner.insert(draft)
    }

    fn update(&self, alert: ExpiryAlert) -> Result<(), RepositoryError> {
        self.inner.update(alert)
    }

    fn fetch(&self, id: AlertId) -> Result<Option<ExpiryAlert>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_for(
        &self,
        document: DocumentId,
        expiry_date: NaiveDate,
    ) -> Result<Option<ExpiryAlert>, RepositoryError> {
        self.inner.find_for(document, expiry_date)
    }

    fn list(&self) -> Result<Vec<ExpiryAlert>, RepositoryError> {
        self.inner.list()
    }
}
