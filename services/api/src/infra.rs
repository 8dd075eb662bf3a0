use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use workforce_compliance::storage::{
    InMemoryAlertStore, InMemoryCatalog, InMemoryDocumentStore, InMemorySignatureStore,
};
use workforce_compliance::workflows::documents::DocumentServices;
use workforce_compliance::workflows::signatures::SignatureService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryDocumentServices =
    DocumentServices<InMemoryCatalog, InMemoryDocumentStore, InMemoryAlertStore>;
pub(crate) type MemorySignatureService = SignatureService<InMemorySignatureStore>;

pub(crate) fn document_services(default_alert_days: u32) -> Arc<MemoryDocumentServices> {
    Arc::new(DocumentServices::new(
        Arc::new(InMemoryCatalog::default()),
        Arc::new(InMemoryDocumentStore::default()),
        Arc::new(InMemoryAlertStore::default()),
        default_alert_days,
    ))
}

pub(crate) fn signature_service() -> Arc<MemorySignatureService> {
    Arc::new(SignatureService::new(Arc::new(
        InMemorySignatureStore::default(),
    )))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
