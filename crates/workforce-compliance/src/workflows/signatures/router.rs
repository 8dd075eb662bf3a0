use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::audit::{lifecycle_violations, AuditRecord, LifecycleViolation};
use super::domain::{
    NewSignatureRequest, NewSigner, SignatureAction, SignatureAuditEntry, SignatureRequest,
    SignatureRequestId, Signer, SignerId,
};
use super::repository::SignatureStore;
use super::service::SignatureService;
use crate::context::RequestContext;
use crate::error::AppError;

/// Router builder exposing signature request bookkeeping and the audit trail.
pub fn signature_router<S>(service: Arc<SignatureService<S>>) -> Router
where
    S: SignatureStore + 'static,
{
    Router::new()
        .route("/api/v1/signatures", post(open_request_handler::<S>))
        .route(
            "/api/v1/signatures/:request_id",
            delete(remove_request_handler::<S>),
        )
        .route(
            "/api/v1/signatures/:request_id/signers",
            post(add_signer_handler::<S>),
        )
        .route(
            "/api/v1/signatures/:request_id/audit",
            get(audit_trail_handler::<S>).post(record_handler::<S>),
        )
        .route("/api/v1/signers/:signer_id", delete(remove_signer_handler::<S>))
        .with_state(service)
}

/// Audit payload without the request id, which comes from the path.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordRequest {
    #[serde(default)]
    signer: Option<SignerId>,
    action: SignatureAction,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditTrailResponse {
    request: SignatureRequestId,
    entries: Vec<SignatureAuditEntry>,
    violations: Vec<LifecycleViolation>,
}

pub(crate) async fn open_request_handler<S>(
    State(service): State<Arc<SignatureService<S>>>,
    headers: HeaderMap,
    Json(request): Json<NewSignatureRequest>,
) -> Result<(StatusCode, Json<SignatureRequest>), AppError>
where
    S: SignatureStore + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    let stored = service.open_request(&ctx, request)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn remove_request_handler<S>(
    State(service): State<Arc<SignatureService<S>>>,
    Path(request_id): Path<u64>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError>
where
    S: SignatureStore + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    service.remove_request(&ctx, SignatureRequestId(request_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn add_signer_handler<S>(
    State(service): State<Arc<SignatureService<S>>>,
    Path(request_id): Path<u64>,
    Json(signer): Json<NewSigner>,
) -> Result<(StatusCode, Json<Signer>), AppError>
where
    S: SignatureStore + 'static,
{
    let stored = service.add_signer(SignatureRequestId(request_id), signer)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn remove_signer_handler<S>(
    State(service): State<Arc<SignatureService<S>>>,
    Path(signer_id): Path<u64>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError>
where
    S: SignatureStore + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    service.remove_signer(&ctx, SignerId(signer_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn record_handler<S>(
    State(service): State<Arc<SignatureService<S>>>,
    Path(request_id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<RecordRequest>,
) -> Result<(StatusCode, Json<SignatureAuditEntry>), AppError>
where
    S: SignatureStore + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    let record = AuditRecord {
        request: SignatureRequestId(request_id),
        signer: payload.signer,
        action: payload.action,
        description: payload.description,
        ip_address: payload.ip_address,
        user_agent: payload.user_agent,
    };
    let entry = service.trail().record(&ctx, record)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(crate) async fn audit_trail_handler<S>(
    State(service): State<Arc<SignatureService<S>>>,
    Path(request_id): Path<u64>,
) -> Result<Json<AuditTrailResponse>, AppError>
where
    S: SignatureStore + 'static,
{
    let request = SignatureRequestId(request_id);
    let entries = service.trail().entries_for(request)?;
    let violations = lifecycle_violations(&entries);
    Ok(Json(AuditTrailResponse {
        request,
        entries,
        violations,
    }))
}
