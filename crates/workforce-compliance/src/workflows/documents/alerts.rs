//! Expiry alert scanning and the alert acknowledgement lifecycle.
//!
//! A document is due once `expiry_date - today <= alert_days` for its type. Alerts are keyed
//! by `(document, expiry_date)`, so a dismissed alert stays dismissed until a renewal moves
//! the expiry date and the document becomes eligible again.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::domain::{DocumentId, DocumentType, DocumentTypeId, EmployeeDocument, EmployeeId};
use super::repository::{AlertRepository, DocumentRepository, DocumentTypeRepository};
use crate::context::{RequestContext, UserId};
use crate::storage::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlertId(pub u64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

/// Notification bucket derived from the days left before expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Days90,
    Days60,
    Days30,
    Days15,
    Days7,
    Days1,
    Expired,
}

impl AlertLevel {
    pub fn from_days(days_remaining: i64) -> Self {
        match days_remaining {
            d if d <= 0 => Self::Expired,
            1 => Self::Days1,
            2..=7 => Self::Days7,
            8..=15 => Self::Days15,
            16..=30 => Self::Days30,
            31..=60 => Self::Days60,
            _ => Self::Days90,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Days90 => "90 Days",
            Self::Days60 => "60 Days",
            Self::Days30 => "30 Days",
            Self::Days15 => "15 Days",
            Self::Days7 => "7 Days",
            Self::Days1 => "1 Day",
            Self::Expired => "Expired",
        }
    }

    pub const fn priority(self) -> AlertPriority {
        match self {
            Self::Expired | Self::Days1 => AlertPriority::Critical,
            Self::Days7 => AlertPriority::High,
            Self::Days15 | Self::Days30 => AlertPriority::Normal,
            Self::Days60 | Self::Days90 => AlertPriority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Raised,
    Acknowledged,
    Escalated,
    Dismissed,
}

impl AlertState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Raised => "raised",
            Self::Acknowledged => "acknowledged",
            Self::Escalated => "escalated",
            Self::Dismissed => "dismissed",
        }
    }
}

/// Persisted alert for one document at one expiry date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub id: AlertId,
    pub document: DocumentId,
    pub employee: EmployeeId,
    pub document_type: DocumentTypeId,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub level: AlertLevel,
    pub priority: AlertPriority,
    pub state: AlertState,
    pub raised_at: DateTime<Utc>,
    pub raised_by: UserId,
    pub acknowledged_by: Option<UserId>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub dismissed_by: Option<UserId>,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
}

impl ExpiryAlert {
    pub fn new(id: AlertId, draft: ExpiryAlertDraft) -> Self {
        let level = AlertLevel::from_days(draft.days_remaining);
        Self {
            id,
            document: draft.document,
            employee: draft.employee,
            document_type: draft.document_type,
            expiry_date: draft.expiry_date,
            days_remaining: draft.days_remaining,
            level,
            priority: level.priority(),
            state: AlertState::Raised,
            raised_at: draft.raised_at,
            raised_by: draft.raised_by,
            acknowledged_by: None,
            acknowledged_at: None,
            dismissed_by: None,
            dismissed_at: None,
            resolution_notes: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state != AlertState::Dismissed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryAlertDraft {
    pub document: DocumentId,
    pub employee: EmployeeId,
    pub document_type: DocumentTypeId,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub raised_at: DateTime<Utc>,
    pub raised_by: UserId,
}

/// A document that has entered its type's alert window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueDocument {
    pub document: DocumentId,
    pub employee: EmployeeId,
    pub document_type: DocumentTypeId,
    pub type_name: String,
    pub sequence: i32,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub level: AlertLevel,
    pub priority: AlertPriority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "document_type")]
pub enum IntegrityIssue {
    MissingExpiryDate,
    UnknownDocumentType(DocumentTypeId),
}

/// Non-fatal scan finding: the document was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataIntegrityWarning {
    pub document: DocumentId,
    pub employee: EmployeeId,
    pub issue: IntegrityIssue,
}

impl fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            IntegrityIssue::MissingExpiryDate => write!(
                f,
                "{} for employee {} has an expiring type but no expiry date",
                self.document, self.employee
            ),
            IntegrityIssue::UnknownDocumentType(document_type) => write!(
                f,
                "{} for employee {} references unknown {}",
                self.document, self.employee, document_type
            ),
        }
    }
}

/// Store failure for one document; the scan moves on to the next document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub document: DocumentId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DueScan {
    pub due: Vec<DueDocument>,
    pub warnings: Vec<DataIntegrityWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub today: NaiveDate,
    pub due: Vec<DueDocument>,
    pub raised: Vec<ExpiryAlert>,
    pub warnings: Vec<DataIntegrityWarning>,
    pub failures: Vec<ScanFailure>,
}

/// Evaluate the alert window for each active document.
///
/// Due documents are ordered by expiry date, then type sequence, then document id.
pub fn find_due(
    documents: &[EmployeeDocument],
    catalog: &[DocumentType],
    today: NaiveDate,
) -> DueScan {
    let types: HashMap<DocumentTypeId, &DocumentType> = catalog
        .iter()
        .map(|document_type| (document_type.id, document_type))
        .collect();

    let mut ordered: Vec<&EmployeeDocument> =
        documents.iter().filter(|document| document.active).collect();
    ordered.sort_by_key(|document| document.id);

    let mut scan = DueScan::default();
    for document in ordered {
        let Some(document_type) = types.get(&document.document_type) else {
            scan.warnings.push(DataIntegrityWarning {
                document: document.id,
                employee: document.employee.clone(),
                issue: IntegrityIssue::UnknownDocumentType(document.document_type),
            });
            continue;
        };
        if !document_type.has_expiry {
            continue;
        }
        let Some(expiry_date) = document.expiry_date else {
            scan.warnings.push(DataIntegrityWarning {
                document: document.id,
                employee: document.employee.clone(),
                issue: IntegrityIssue::MissingExpiryDate,
            });
            continue;
        };

        let days_remaining = expiry_date.signed_duration_since(today).num_days();
        if days_remaining > i64::from(document_type.alert_days) {
            continue;
        }

        let level = AlertLevel::from_days(days_remaining);
        scan.due.push(DueDocument {
            document: document.id,
            employee: document.employee.clone(),
            document_type: document_type.id,
            type_name: document_type.name.clone(),
            sequence: document_type.sequence,
            expiry_date,
            days_remaining,
            level,
            priority: level.priority(),
        });
    }

    scan.due.sort_by(|a, b| {
        a.expiry_date
            .cmp(&b.expiry_date)
            .then_with(|| a.sequence.cmp(&b.sequence))
            .then_with(|| a.document.cmp(&b.document))
    });
    scan
}

/// Errors raised by the alert scan and lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("{0} not found")]
    NotFound(AlertId),
    #[error("cannot {action} {alert} while it is {}", .state.label())]
    InvalidTransition {
        alert: AlertId,
        state: AlertState,
        action: &'static str,
    },
    #[error("required field missing: {field}")]
    RequiredField { field: &'static str },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Periodic expiry scan plus the acknowledge / escalate / dismiss lifecycle.
pub struct ExpiryAlertScheduler<T, D, A> {
    types: Arc<T>,
    documents: Arc<D>,
    alerts: Arc<A>,
}

impl<T, D, A> ExpiryAlertScheduler<T, D, A>
where
    T: DocumentTypeRepository + 'static,
    D: DocumentRepository + 'static,
    A: AlertRepository + 'static,
{
    pub fn new(types: Arc<T>, documents: Arc<D>, alerts: Arc<A>) -> Self {
        Self {
            types,
            documents,
            alerts,
        }
    }

    /// Run one scan as of `ctx.today()`, raising alerts for newly due documents.
    pub fn scan(&self, ctx: &RequestContext) -> Result<ScanReport, AlertError> {
        let today = ctx.today();
        let catalog = self.types.list()?;
        let snapshot = self.documents.active_snapshot()?;
        let DueScan { due, warnings } = find_due(&snapshot, &catalog, today);

        for warning in &warnings {
            warn!(document = %warning.document, "data integrity warning: {warning}");
        }

        let mut raised = Vec::new();
        let mut failures = Vec::new();
        for entry in &due {
            match self.raise_if_eligible(ctx, entry) {
                Ok(Some(alert)) => raised.push(alert),
                Ok(None) => {}
                Err(err) => {
                    error!(document = %entry.document, error = %err, "failed to raise expiry alert");
                    failures.push(ScanFailure {
                        document: entry.document,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            %today,
            due = due.len(),
            raised = raised.len(),
            warnings = warnings.len(),
            failures = failures.len(),
            "expiry scan finished"
        );

        Ok(ScanReport {
            today,
            due,
            raised,
            warnings,
            failures,
        })
    }

    fn raise_if_eligible(
        &self,
        ctx: &RequestContext,
        entry: &DueDocument,
    ) -> Result<Option<ExpiryAlert>, RepositoryError> {
        if let Some(existing) = self.alerts.find_for(entry.document, entry.expiry_date)? {
            debug!(alert = %existing.id, state = existing.state.label(), "alert already recorded");
            return Ok(None);
        }

        let draft = ExpiryAlertDraft {
            document: entry.document,
            employee: entry.employee.clone(),
            document_type: entry.document_type,
            expiry_date: entry.expiry_date,
            days_remaining: entry.days_remaining,
            raised_at: ctx.now,
            raised_by: ctx.acting_user.clone(),
        };
        match self.alerts.insert(draft) {
            Ok(alert) => Ok(Some(alert)),
            // A concurrent scan got there first.
            Err(RepositoryError::Conflict(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn acknowledge(&self, ctx: &RequestContext, id: AlertId) -> Result<ExpiryAlert, AlertError> {
        let mut alert = self.fetch(id)?;
        if !alert.is_open() {
            return Err(AlertError::InvalidTransition {
                alert: id,
                state: alert.state,
                action: "acknowledge",
            });
        }
        alert.state = AlertState::Acknowledged;
        alert.acknowledged_by = Some(ctx.acting_user.clone());
        alert.acknowledged_at = Some(ctx.now);
        self.alerts.update(alert.clone())?;
        info!(user = %ctx.acting_user, alert = %id, "expiry alert acknowledged");
        Ok(alert)
    }

    pub fn escalate(&self, ctx: &RequestContext, id: AlertId) -> Result<ExpiryAlert, AlertError> {
        let mut alert = self.fetch(id)?;
        if !alert.is_open() {
            return Err(AlertError::InvalidTransition {
                alert: id,
                state: alert.state,
                action: "escalate",
            });
        }
        alert.state = AlertState::Escalated;
        self.alerts.update(alert.clone())?;
        warn!(user = %ctx.acting_user, alert = %id, document = %alert.document, "expiry alert escalated");
        Ok(alert)
    }

    /// Close the alert. It is not raised again for the same expiry date.
    pub fn dismiss(
        &self,
        ctx: &RequestContext,
        id: AlertId,
        resolution_notes: &str,
    ) -> Result<ExpiryAlert, AlertError> {
        let notes = resolution_notes.trim();
        if notes.is_empty() {
            return Err(AlertError::RequiredField {
                field: "resolution_notes",
            });
        }
        let mut alert = self.fetch(id)?;
        if !alert.is_open() {
            return Err(AlertError::InvalidTransition {
                alert: id,
                state: alert.state,
                action: "dismiss",
            });
        }
        alert.state = AlertState::Dismissed;
        alert.dismissed_by = Some(ctx.acting_user.clone());
        alert.dismissed_at = Some(ctx.now);
        alert.resolution_notes = Some(notes.to_string());
        self.alerts.update(alert.clone())?;
        info!(user = %ctx.acting_user, alert = %id, "expiry alert dismissed");
        Ok(alert)
    }

    /// Undismissed alerts, most urgent first.
    pub fn open_alerts(&self) -> Result<Vec<ExpiryAlert>, AlertError> {
        let mut alerts: Vec<ExpiryAlert> = self
            .alerts
            .list()?
            .into_iter()
            .filter(ExpiryAlert::is_open)
            .collect();
        alerts.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.expiry_date.cmp(&b.expiry_date))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(alerts)
    }

    /// Scan on a fixed period until the task is dropped.
    pub async fn run_periodic(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(err) = self.scan(&RequestContext::system()) {
                error!(error = %err, "scheduled expiry scan failed");
            }
        }
    }

    fn fetch(&self, id: AlertId) -> Result<ExpiryAlert, AlertError> {
        self.alerts.fetch(id)?.ok_or(AlertError::NotFound(id))
    }
}
