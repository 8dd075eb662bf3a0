use super::common::*;
use crate::workflows::documents::compliance::summarize;
use crate::workflows::documents::{ComplianceStatus, EmployeeId, NewDocumentType};

#[test]
fn summary_counts_statuses_with_per_type_lead_time() {
    let (services, _, _) = build_services();
    let passport = register_type(&services, "Passport", 10, 90);
    let visa = register_type(&services, "Residence Visa", 30, 60);
    let medical = register_type(&services, "Medical Fitness", 60, 15);

    // 80 days out: expiring under the 90 day passport window.
    capture(&services, "E-100", &passport, Some(date(2025, 8, 20)));
    // 80 days out: still valid under the 60 day visa window.
    capture(&services, "E-100", &visa, Some(date(2025, 8, 20)));
    capture(&services, "E-100", &medical, Some(date(2025, 5, 31)));

    let summary = services
        .registry
        .compliance(&EmployeeId("E-100".to_string()), today())
        .expect("summary");

    assert_eq!(summary.total_documents, 3);
    assert_eq!(summary.valid_documents, 1);
    assert_eq!(summary.expiring_documents, 1);
    assert_eq!(summary.expired_documents, 1);
    assert_eq!(summary.compliance_score, 33.33);
    assert_eq!(summary.status, ComplianceStatus::NonCompliant);
}

#[test]
fn missing_mandatory_type_makes_employee_non_compliant() {
    let (services, _, _) = build_services();
    let passport = services
        .catalog
        .register(
            &ctx(),
            NewDocumentType {
                is_mandatory: true,
                ..document_type_input("Passport", 10, 90)
            },
        )
        .expect("registers");
    let labour = services
        .catalog
        .register(
            &ctx(),
            NewDocumentType {
                is_mandatory: true,
                ..document_type_input("Labour Card", 40, 30)
            },
        )
        .expect("registers");

    capture(&services, "E-200", &passport, Some(date(2030, 1, 1)));

    let summary = services
        .registry
        .compliance(&EmployeeId("E-200".to_string()), today())
        .expect("summary");

    assert_eq!(summary.valid_documents, 1);
    assert_eq!(summary.compliance_score, 100.0);
    assert_eq!(summary.missing_mandatory.len(), 1);
    assert_eq!(summary.missing_mandatory[0].document_type, labour.id);
    assert_eq!(summary.status, ComplianceStatus::NonCompliant);
}

#[test]
fn expiring_only_yields_warning_and_inactive_rows_are_ignored() {
    let (services, _, _) = build_services();
    let emirates = register_type(&services, "Emirates ID", 20, 30);
    capture(&services, "E-300", &emirates, Some(date(2025, 6, 20)));
    let stale = capture(&services, "E-300", &emirates, Some(date(2024, 1, 1)));
    services
        .registry
        .deactivate(&ctx(), stale.id)
        .expect("deactivates");

    let summary = services
        .registry
        .compliance(&EmployeeId("E-300".to_string()), today())
        .expect("summary");

    assert_eq!(summary.total_documents, 1);
    assert_eq!(summary.expired_documents, 0);
    assert_eq!(summary.status, ComplianceStatus::Warning);
}

#[test]
fn employee_without_documents_scores_zero() {
    let summary = summarize(&EmployeeId("E-404".to_string()), &[], &[], today());
    assert_eq!(summary.total_documents, 0);
    assert_eq!(summary.compliance_score, 0.0);
    assert_eq!(summary.status, ComplianceStatus::Compliant);
}

#[test]
fn employee_views_label_each_status() {
    let (services, _, _) = build_services();
    let passport = register_type(&services, "Passport", 10, 90);
    let visa = register_type(&services, "Residence Visa", 30, 60);
    let licence = register_type(&services, "Driving Licence", 40, 30);
    capture(&services, "E-200", &passport, Some(date(2025, 8, 1)));
    capture(&services, "E-200", &visa, Some(date(2025, 5, 20)));
    capture(&services, "E-200", &licence, Some(date(2027, 3, 1)));

    let views = services
        .registry
        .list_for_employee(&EmployeeId("E-200".to_string()), today())
        .expect("lists");
    let labels: Vec<(&str, &str)> = views
        .iter()
        .map(|view| (view.type_name.as_str(), view.status.label()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("Residence Visa", "Expired"),
            ("Passport", "Expiring Soon"),
            ("Driving Licence", "Valid"),
        ]
    );
}
