use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::alerts::{AlertId, ExpiryAlert, ScanReport};
use super::catalog::{DocumentTypePatch, NewDocumentType};
use super::compliance::ComplianceSummary;
use super::domain::{DocumentId, DocumentType, DocumentTypeId, EmployeeDocument, EmployeeId};
use super::import::{DocumentImporter, ImportReport};
use super::renewal::{DocumentSelector, RenewalEvent};
use super::repository::{AlertRepository, DocumentRepository, DocumentTypeRepository};
use super::service::{DocumentView, NewEmployeeDocument};
use super::DocumentServices;
use crate::context::RequestContext;
use crate::error::AppError;

type Services<T, D, A> = State<Arc<DocumentServices<T, D, A>>>;

/// Router builder exposing catalog, document, renewal, and alert endpoints.
pub fn document_router<T, D, A>(services: Arc<DocumentServices<T, D, A>>) -> Router
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/document-types",
            get(list_types_handler::<T, D, A>).post(register_type_handler::<T, D, A>),
        )
        .route(
            "/api/v1/document-types/:type_id",
            patch(update_type_handler::<T, D, A>),
        )
        .route(
            "/api/v1/document-types/:type_id/deactivate",
            post(deactivate_type_handler::<T, D, A>),
        )
        .route("/api/v1/documents", post(capture_handler::<T, D, A>))
        .route("/api/v1/documents/import", post(import_handler::<T, D, A>))
        .route("/api/v1/documents/renew", post(renew_selected_handler::<T, D, A>))
        .route(
            "/api/v1/documents/:document_id",
            get(document_handler::<T, D, A>),
        )
        .route(
            "/api/v1/documents/:document_id/renew",
            post(renew_handler::<T, D, A>),
        )
        .route(
            "/api/v1/documents/:document_id/deactivate",
            post(deactivate_document_handler::<T, D, A>),
        )
        .route(
            "/api/v1/employees/:employee_id/documents",
            get(employee_documents_handler::<T, D, A>),
        )
        .route(
            "/api/v1/employees/:employee_id/compliance",
            get(compliance_handler::<T, D, A>),
        )
        .route("/api/v1/alerts", get(open_alerts_handler::<T, D, A>))
        .route("/api/v1/alerts/scan", post(scan_handler::<T, D, A>))
        .route(
            "/api/v1/alerts/:alert_id/acknowledge",
            post(acknowledge_handler::<T, D, A>),
        )
        .route(
            "/api/v1/alerts/:alert_id/escalate",
            post(escalate_handler::<T, D, A>),
        )
        .route(
            "/api/v1/alerts/:alert_id/dismiss",
            post(dismiss_handler::<T, D, A>),
        )
        .with_state(services)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListTypesQuery {
    #[serde(default)]
    include_inactive: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn context(&self, headers: &HeaderMap) -> RequestContext {
        let ctx = RequestContext::from_headers(headers);
        match self.as_of {
            Some(date) => ctx.as_of(date),
            None => ctx,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenewSelectedRequest {
    target: DocumentSelector,
    #[serde(flatten)]
    event: RenewalEvent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DismissRequest {
    #[serde(default)]
    resolution_notes: String,
}

pub(crate) async fn list_types_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Query(query): Query<ListTypesQuery>,
) -> Result<Json<Vec<DocumentType>>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    Ok(Json(services.catalog.list(query.include_inactive)?))
}

pub(crate) async fn register_type_handler<T, D, A>(
    State(services): Services<T, D, A>,
    headers: HeaderMap,
    Json(input): Json<NewDocumentType>,
) -> Result<(StatusCode, Json<DocumentType>), AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    let stored = services.catalog.register(&ctx, input)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn update_type_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(type_id): Path<u64>,
    headers: HeaderMap,
    Json(patch): Json<DocumentTypePatch>,
) -> Result<Json<DocumentType>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    let updated = services
        .catalog
        .update(&ctx, DocumentTypeId(type_id), patch)?;
    Ok(Json(updated))
}

pub(crate) async fn deactivate_type_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(type_id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<DocumentType>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    Ok(Json(
        services.catalog.deactivate(&ctx, DocumentTypeId(type_id))?,
    ))
}

pub(crate) async fn capture_handler<T, D, A>(
    State(services): Services<T, D, A>,
    headers: HeaderMap,
    Json(input): Json<NewEmployeeDocument>,
) -> Result<(StatusCode, Json<EmployeeDocument>), AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    let stored = services.registry.capture(&ctx, input)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn import_handler<T, D, A>(
    State(services): Services<T, D, A>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ImportReport>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    let report = DocumentImporter::from_reader(body.as_bytes(), &services.registry, &ctx)?;
    Ok(Json(report))
}

pub(crate) async fn document_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(document_id): Path<u64>,
    Query(query): Query<AsOfQuery>,
    headers: HeaderMap,
) -> Result<Json<DocumentView>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = query.context(&headers);
    let view = services
        .registry
        .view(DocumentId(document_id), ctx.today())?;
    Ok(Json(view))
}

pub(crate) async fn renew_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(document_id): Path<u64>,
    headers: HeaderMap,
    Json(event): Json<RenewalEvent>,
) -> Result<StatusCode, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    services
        .renewal
        .renew(&ctx, &DocumentSelector::single(DocumentId(document_id)), event)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn renew_selected_handler<T, D, A>(
    State(services): Services<T, D, A>,
    headers: HeaderMap,
    Json(request): Json<RenewSelectedRequest>,
) -> Result<StatusCode, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    services
        .renewal
        .renew(&ctx, &request.target, request.event)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn deactivate_document_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(document_id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<EmployeeDocument>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    Ok(Json(
        services.registry.deactivate(&ctx, DocumentId(document_id))?,
    ))
}

pub(crate) async fn employee_documents_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(employee_id): Path<String>,
    Query(query): Query<AsOfQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<DocumentView>>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = query.context(&headers);
    let documents = services
        .registry
        .list_for_employee(&EmployeeId(employee_id), ctx.today())?;
    Ok(Json(documents))
}

pub(crate) async fn compliance_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(employee_id): Path<String>,
    Query(query): Query<AsOfQuery>,
    headers: HeaderMap,
) -> Result<Json<ComplianceSummary>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = query.context(&headers);
    let summary = services
        .registry
        .compliance(&EmployeeId(employee_id), ctx.today())?;
    Ok(Json(summary))
}

pub(crate) async fn open_alerts_handler<T, D, A>(
    State(services): Services<T, D, A>,
) -> Result<Json<Vec<ExpiryAlert>>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    Ok(Json(services.alerts.open_alerts()?))
}

pub(crate) async fn scan_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Query(query): Query<AsOfQuery>,
    headers: HeaderMap,
) -> Result<Json<ScanReport>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = query.context(&headers);
    Ok(Json(services.alerts.scan(&ctx)?))
}

pub(crate) async fn acknowledge_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(alert_id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<ExpiryAlert>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    Ok(Json(services.alerts.acknowledge(&ctx, AlertId(alert_id))?))
}

pub(crate) async fn escalate_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(alert_id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<ExpiryAlert>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    Ok(Json(services.alerts.escalate(&ctx, AlertId(alert_id))?))
}

pub(crate) async fn dismiss_handler<T, D, A>(
    State(services): Services<T, D, A>,
    Path(alert_id): Path<u64>,
    headers: HeaderMap,
    Json(request): Json<DismissRequest>,
) -> Result<Json<ExpiryAlert>, AppError>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    let ctx = RequestContext::from_headers(&headers);
    let alert = services
        .alerts
        .dismiss(&ctx, AlertId(alert_id), &request.resolution_notes)?;
    Ok(Json(alert))
}
