use crate::infra::{document_services, signature_service, MemoryDocumentServices};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use workforce_compliance::config::AppConfig;
use workforce_compliance::context::RequestContext;
use workforce_compliance::error::AppError;
use workforce_compliance::workflows::documents::{
    DocumentImporter, DocumentSelector, DocumentType, EmployeeId, NewEmployeeDocument,
    RenewalEvent, ScanReport,
};
use workforce_compliance::workflows::signatures::{
    lifecycle_violations, AuditRecord, NewSignatureRequest, NewSigner, SignatureAction,
};

#[derive(Args, Debug)]
pub(crate) struct ScanArgs {
    /// CSV export with Employee, Document Type, Number, Issue Date, Expiry Date columns
    #[arg(long)]
    pub(crate) documents: PathBuf,
    /// Evaluate the scan as of this date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the scan report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for the walkthrough (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the signature audit trail portion of the demo.
    #[arg(long)]
    pub(crate) skip_signatures: bool,
}

pub(crate) fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let ScanArgs {
        documents,
        today,
        json,
    } = args;

    let config = AppConfig::load()?;
    let services = document_services(config.alerts.default_alert_days);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let ctx = RequestContext::system().as_of(today);

    services.catalog.seed_standard(&ctx)?;
    let import = DocumentImporter::from_path(&documents, &services.registry, &ctx)?;
    let report = services.alerts.scan(&ctx)?;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Scan report unavailable: {err}"),
        }
        return Ok(());
    }

    println!(
        "Imported {} documents from {} ({} rows rejected)",
        import.created.len(),
        documents.display(),
        import.failures.len()
    );
    for failure in &import.failures {
        println!("  - line {}: {}", failure.line, failure.reason);
    }
    render_scan(&report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_signatures,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let ctx = RequestContext::new("hr.officer").as_of(today);
    let services = document_services(workforce_compliance::workflows::documents::DEFAULT_ALERT_DAYS);

    println!("Workforce compliance demo ({today})");
    services.catalog.seed_standard(&ctx)?;
    let catalog = services.catalog.list(false)?;
    println!("Catalog:");
    for document_type in &catalog {
        let window = if document_type.has_expiry {
            format!("alerts {} days ahead", document_type.alert_days)
        } else {
            "no expiry".to_string()
        };
        println!(
            "  - {} [{}] {}{}",
            document_type.name,
            document_type.category.label(),
            window,
            if document_type.is_mandatory { ", mandatory" } else { "" }
        );
    }

    let employee = EmployeeId("E-1001".to_string());
    let held = [
        ("PASS", Some(today + Duration::days(75))),
        ("EID", Some(today + Duration::days(12))),
        ("VISA", Some(today - Duration::days(3))),
        ("DEG", None),
    ];
    for (code, expiry_date) in held {
        let Some(document_type) = find_type(&catalog, code) else {
            continue;
        };
        capture_demo_document(&services, &ctx, &employee, document_type, expiry_date)?;
    }

    println!("\nDocuments held by {employee}");
    for view in services.registry.list_for_employee(&employee, today)? {
        let remaining = view
            .days_remaining
            .map(|days| format!(", {days} days left"))
            .unwrap_or_default();
        println!("  - {}: {}{}", view.type_name, view.status.label(), remaining);
    }

    println!("\nExpiry scan");
    let report = services.alerts.scan(&ctx)?;
    render_scan(&report);

    let summary = services.registry.compliance(&employee, today)?;
    println!(
        "\nCompliance for {}: {} (score {:.2}, {} expiring, {} expired)",
        summary.employee,
        summary.status.label(),
        summary.compliance_score,
        summary.expiring_documents,
        summary.expired_documents
    );
    for gap in &summary.missing_mandatory {
        println!("  - missing mandatory document: {}", gap.name);
    }

    if let Some(visa) = find_type(&catalog, "VISA") {
        services.renewal.renew(
            &ctx,
            &DocumentSelector::EmployeeType {
                employee: employee.clone(),
                document_type: visa.id,
            },
            RenewalEvent {
                new_number: Some("201/2025/7654321".to_string()),
                new_issue_date: Some(today),
                new_expiry_date: Some(today + Duration::days(730)),
                new_attachment: Some("blob://visa/E-1001/2025".to_string()),
                new_attachment_name: Some("residence-visa.pdf".to_string()),
                notes: Some("renewed after medical fitness clearance".to_string()),
            },
        )?;
        println!("\nRenewed {} for {}", visa.name, employee);
    }

    for alert in services.alerts.open_alerts()? {
        if alert.days_remaining <= 0 {
            services
                .alerts
                .dismiss(&ctx, alert.id, "superseded by renewal")?;
            println!("  Dismissed {} ({})", alert.id, alert.level.label());
        }
    }

    let summary = services.registry.compliance(&employee, today)?;
    println!(
        "Compliance after renewal: {} (score {:.2})",
        summary.status.label(),
        summary.compliance_score
    );

    if skip_signatures {
        return Ok(());
    }

    println!("\nSignature audit trail");
    let signatures = signature_service();
    let request = signatures.open_request(
        &ctx,
        NewSignatureRequest {
            reference: "SR-E-1001".to_string(),
            document_name: "Employment Contract".to_string(),
        },
    )?;
    let signer = signatures.add_signer(
        request.id,
        NewSigner {
            name: "Employee 1001".to_string(),
            email: "e1001@example.com".to_string(),
        },
    )?;
    let trail = signatures.trail();
    for (minutes, action) in [
        (5, SignatureAction::Sent),
        (90, SignatureAction::Viewed),
        (95, SignatureAction::Signed),
        (96, SignatureAction::Completed),
    ] {
        let portal = RequestContext::at("signing.portal", ctx.now + Duration::minutes(minutes));
        trail.record(
            &portal,
            AuditRecord::new(request.id, action).signer(signer.id),
        )?;
    }

    let entries = trail.entries_for(request.id)?;
    for entry in &entries {
        println!(
            "  - {} {} by {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action.label(),
            entry.acting_user
        );
    }
    let violations = lifecycle_violations(&entries);
    if violations.is_empty() {
        println!("  Lifecycle: consistent");
    } else {
        println!("  Lifecycle: {} out-of-order actions", violations.len());
    }

    Ok(())
}

fn find_type<'a>(catalog: &'a [DocumentType], code: &str) -> Option<&'a DocumentType> {
    catalog
        .iter()
        .find(|document_type| document_type.code.as_deref() == Some(code))
}

fn capture_demo_document(
    services: &MemoryDocumentServices,
    ctx: &RequestContext,
    employee: &EmployeeId,
    document_type: &DocumentType,
    expiry_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    let issue_date = expiry_date.map(|expiry| expiry - Duration::days(730));
    services.registry.capture(
        ctx,
        NewEmployeeDocument {
            employee: employee.clone(),
            document_type: document_type.id,
            name: None,
            number: Some(format!("{}-{}", document_type.code.as_deref().unwrap_or("DOC"), employee)),
            issue_date,
            expiry_date,
            issue_place: Some("Dubai".to_string()),
            issue_authority: None,
            attachment: None,
            notes: None,
        },
    )?;
    Ok(())
}

fn render_scan(report: &ScanReport) {
    println!(
        "Scan as of {}: {} due, {} new alerts, {} warnings, {} failures",
        report.today,
        report.due.len(),
        report.raised.len(),
        report.warnings.len(),
        report.failures.len()
    );
    for entry in &report.due {
        println!(
            "  - {} {} for {} expires {} ({} days, {:?} priority)",
            entry.document,
            entry.type_name,
            entry.employee,
            entry.expiry_date,
            entry.days_remaining,
            entry.priority
        );
    }
    for warning in &report.warnings {
        println!("  ! {warning}");
    }
    for failure in &report.failures {
        println!("  x {}: {}", failure.document, failure.reason);
    }
}
