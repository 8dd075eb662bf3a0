use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    DocumentStatus, DocumentType, DocumentTypeId, EmployeeDocument, EmployeeId,
    DEFAULT_ALERT_DAYS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    Warning,
    NonCompliant,
}

impl ComplianceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::Warning => "Warning",
            Self::NonCompliant => "Non-Compliant",
        }
    }
}

/// Mandatory catalog entry the employee holds no active document for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MandatoryGap {
    pub document_type: DocumentTypeId,
    pub name: String,
}

/// Per-employee roll-up of document health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub employee: EmployeeId,
    pub total_documents: usize,
    pub valid_documents: usize,
    pub expiring_documents: usize,
    pub expired_documents: usize,
    pub missing_mandatory: Vec<MandatoryGap>,
    /// Share of valid documents, 0-100 with two decimals.
    pub compliance_score: f64,
    pub status: ComplianceStatus,
}

pub fn summarize(
    employee: &EmployeeId,
    documents: &[EmployeeDocument],
    catalog: &[DocumentType],
    today: NaiveDate,
) -> ComplianceSummary {
    let lead_times: HashMap<DocumentTypeId, u32> = catalog
        .iter()
        .map(|document_type| (document_type.id, document_type.alert_days))
        .collect();

    let held: Vec<&EmployeeDocument> = documents
        .iter()
        .filter(|document| document.active && &document.employee == employee)
        .collect();

    let (mut valid, mut expiring, mut expired) = (0, 0, 0);
    for document in &held {
        let alert_days = lead_times
            .get(&document.document_type)
            .copied()
            .unwrap_or(DEFAULT_ALERT_DAYS);
        match document.status(alert_days, today) {
            DocumentStatus::Valid => valid += 1,
            DocumentStatus::Expiring => expiring += 1,
            DocumentStatus::Expired => expired += 1,
        }
    }

    let held_types: HashSet<DocumentTypeId> =
        held.iter().map(|document| document.document_type).collect();
    let missing_mandatory: Vec<MandatoryGap> = catalog
        .iter()
        .filter(|document_type| document_type.active && document_type.is_mandatory)
        .filter(|document_type| !held_types.contains(&document_type.id))
        .map(|document_type| MandatoryGap {
            document_type: document_type.id,
            name: document_type.name.clone(),
        })
        .collect();

    let total = held.len();
    let compliance_score = if total == 0 {
        0.0
    } else {
        ((valid as f64 / total as f64) * 10_000.0).round() / 100.0
    };

    let status = if expired > 0 || !missing_mandatory.is_empty() {
        ComplianceStatus::NonCompliant
    } else if expiring > 0 {
        ComplianceStatus::Warning
    } else {
        ComplianceStatus::Compliant
    };

    ComplianceSummary {
        employee: employee.clone(),
        total_documents: total,
        valid_documents: valid,
        expiring_documents: expiring,
        expired_documents: expired,
        missing_mandatory,
        compliance_score,
        status,
    }
}
