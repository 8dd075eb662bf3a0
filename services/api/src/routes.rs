use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use workforce_compliance::workflows::documents::{
    document_router, AlertRepository, DocumentRepository, DocumentServices,
    DocumentTypeRepository,
};
use workforce_compliance::workflows::signatures::{
    signature_router, SignatureService, SignatureStore,
};

pub(crate) fn with_compliance_routes<T, D, A, S>(
    documents: Arc<DocumentServices<T, D, A>>,
    signatures: Arc<SignatureService<S>>,
) -> axum::Router
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
    S: SignatureStore + 'static,
{
    document_router(documents)
        .merge(signature_router(signatures))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
