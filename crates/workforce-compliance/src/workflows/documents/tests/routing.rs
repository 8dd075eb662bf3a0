use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::context::ACTING_USER_HEADER;
use crate::workflows::documents::{document_router, DocumentQuery, DocumentRepository};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(ACTING_USER_HEADER, "hr.officer")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn register_route_creates_and_rejects_duplicates() {
    let (services, _, _) = build_services();
    let router = document_router(services);
    let payload = json!({
        "name": "Passport",
        "code": "PASS",
        "sequence": 10,
        "is_mandatory": true,
        "alert_days": 90,
        "category": "identification"
    });

    let created = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/document-types", payload.clone()))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = read_json_body(created).await;
    assert_eq!(body.get("alert_days"), Some(&json!(90)));
    assert_eq!(body.get("category"), Some(&json!("identification")));

    let duplicate = router
        .oneshot(json_request("POST", "/api/v1/document-types", payload))
        .await
        .expect("route executes");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn capture_route_rejects_deactivated_type() {
    let (services, documents, _) = build_services();
    let labour = register_type(&services, "Labour Card", 40, 30);
    services
        .catalog
        .deactivate(&ctx(), labour.id)
        .expect("deactivates");
    let router = document_router(services);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/documents",
            json!({
                "employee": "E-100",
                "document_type": labour.id.0,
                "expiry_date": "2026-01-01"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("inactive"));
    assert!(documents
        .find(&DocumentQuery::default())
        .expect("find succeeds")
        .is_empty());
}

#[tokio::test]
async fn capture_route_rejects_missing_expiry() {
    let (services, _, _) = build_services();
    let passport = register_type(&services, "Passport", 10, 90);
    let router = document_router(services);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/documents",
            json!({ "employee": "E-100", "document_type": passport.id.0 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("expiry_date"));
}

#[tokio::test]
async fn renew_route_returns_no_content_and_view_reflects_it() {
    let (services, _, _) = build_services();
    let passport = register_type(&services, "Passport", 10, 90);
    let document = capture(&services, "E-100", &passport, Some(date(2025, 1, 1)));
    let router = document_router(services);

    let renewed = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/documents/{}/renew", document.id.0),
            json!({ "new_expiry_date": "2026-01-01", "notes": "renewed early" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(renewed.status(), StatusCode::NO_CONTENT);

    let view = router
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/documents/{}?as_of=2025-06-01", document.id.0),
        ))
        .await
        .expect("route executes");
    assert_eq!(view.status(), StatusCode::OK);
    let body = read_json_body(view).await;
    assert_eq!(body["expiry_date"], json!("2026-01-01"));
    assert_eq!(body["number"], json!("123"));
    assert_eq!(body["status"], json!("valid"));
    assert_eq!(body["type_name"], json!("Passport"));
    assert!(body["notes"]
        .as_str()
        .unwrap_or_default()
        .ends_with("Renewal Notes: renewed early"));
}

#[tokio::test]
async fn renew_by_selector_reports_ambiguous_target() {
    let (services, _, _) = build_services();
    let passport = register_type(&services, "Passport", 10, 90);
    capture(&services, "E-100", &passport, Some(date(2025, 1, 1)));
    capture(&services, "E-100", &passport, Some(date(2025, 3, 1)));
    let router = document_router(services);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/documents/renew",
            json!({
                "target": {
                    "employee_type": { "employee": "E-100", "document_type": passport.id.0 }
                },
                "new_expiry_date": "2026-01-01"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let (services, _, _) = build_services();
    let router = document_router(services);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/documents/77"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scan_and_dismiss_routes_follow_alert_lifecycle() {
    let (services, _, _) = build_services();
    let passport = register_type(&services, "Passport", 10, 90);
    capture(&services, "E-100", &passport, Some(date(2025, 7, 1)));
    let router = document_router(services);

    let scan = router
        .clone()
        .oneshot(empty_request("POST", "/api/v1/alerts/scan?as_of=2025-06-01"))
        .await
        .expect("route executes");
    assert_eq!(scan.status(), StatusCode::OK);
    let report = read_json_body(scan).await;
    assert_eq!(report["today"], json!("2025-06-01"));
    let raised = report["raised"].as_array().expect("raised list");
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0]["level"], json!("days30"));
    let alert_id = raised[0]["id"].as_u64().expect("alert id");

    let missing_notes = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/alerts/{alert_id}/dismiss"),
            json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(missing_notes.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let dismissed = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/alerts/{alert_id}/dismiss"),
            json!({ "resolution_notes": "renewal booked" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(dismissed.status(), StatusCode::OK);
    let body = read_json_body(dismissed).await;
    assert_eq!(body["state"], json!("dismissed"));
    assert_eq!(body["dismissed_by"], json!("hr.officer"));

    let again = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/alerts/{alert_id}/acknowledge"),
            json!({}),
        ))
        .await
        .expect("route executes");
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let open = router
        .oneshot(empty_request("GET", "/api/v1/alerts"))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(open).await, json!([]));
}

#[tokio::test]
async fn compliance_route_summarizes_employee() {
    let (services, _, _) = build_services();
    let passport = register_type(&services, "Passport", 10, 90);
    capture(&services, "E-100", &passport, Some(date(2030, 1, 1)));
    let router = document_router(services);

    let response = router
        .oneshot(empty_request(
            "GET",
            "/api/v1/employees/E-100/compliance?as_of=2025-06-01",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["employee"], json!("E-100"));
    assert_eq!(body["valid_documents"], json!(1));
    assert_eq!(body["status"], json!("compliant"));
}

#[tokio::test]
async fn import_route_accepts_csv_body() {
    let (services, _, _) = build_services();
    services.catalog.seed_standard(&ctx()).expect("seeds");
    let router = document_router(services);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/documents/import")
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(
                    "Employee,Document Type,Expiry Date\nE-100,Passport,2029-01-01\nE-100,Visa Card,2029-01-01\n",
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["created"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["failures"][0]["line"], json!(3));
}
