use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert lead time applied when a type does not override it.
pub const DEFAULT_ALERT_DAYS: u32 = 30;
pub const DEFAULT_SEQUENCE: i32 = 10;

/// Identifier wrapper for catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentTypeId(pub u64);

/// Identifier wrapper for employee documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

/// Identifier of the employee owning a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for DocumentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type-{}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Identification,
    Visa,
    Employment,
    Education,
    Medical,
    #[default]
    Other,
}

impl DocumentCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Identification => "Identification",
            Self::Visa => "Visa & Immigration",
            Self::Employment => "Employment",
            Self::Education => "Education",
            Self::Medical => "Medical",
            Self::Other => "Other",
        }
    }
}

/// Reference data describing a category of document and its expiry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: DocumentTypeId,
    pub name: String,
    pub code: Option<String>,
    pub sequence: i32,
    pub active: bool,
    pub is_mandatory: bool,
    pub has_expiry: bool,
    pub alert_days: u32,
    pub category: DocumentCategory,
    pub description: Option<String>,
}

impl DocumentType {
    pub fn new(id: DocumentTypeId, draft: DocumentTypeDraft) -> Self {
        Self {
            id,
            name: draft.name,
            code: draft.code,
            sequence: draft.sequence,
            active: true,
            is_mandatory: draft.is_mandatory,
            has_expiry: draft.has_expiry,
            alert_days: draft.alert_days,
            category: draft.category,
            description: draft.description,
        }
    }

    /// Case-insensitive match on the type name or code.
    pub fn matches_label(&self, label: &str) -> bool {
        let label = label.trim();
        self.name.eq_ignore_ascii_case(label)
            || self
                .code
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case(label))
    }
}

/// Fully-resolved catalog entry ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypeDraft {
    pub name: String,
    pub code: Option<String>,
    pub sequence: i32,
    pub is_mandatory: bool,
    pub has_expiry: bool,
    pub alert_days: u32,
    pub category: DocumentCategory,
    pub description: Option<String>,
}

/// Reference to a blob held by the external attachment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub blob_key: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// One physical document held by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDocument {
    pub id: DocumentId,
    pub employee: EmployeeId,
    pub document_type: DocumentTypeId,
    pub name: String,
    pub number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub issue_place: Option<String>,
    pub issue_authority: Option<String>,
    pub attachment: Option<AttachmentRef>,
    pub notes: Option<String>,
    pub active: bool,
}

impl EmployeeDocument {
    pub fn new(id: DocumentId, draft: EmployeeDocumentDraft) -> Self {
        Self {
            id,
            employee: draft.employee,
            document_type: draft.document_type,
            name: draft.name,
            number: draft.number,
            issue_date: draft.issue_date,
            expiry_date: draft.expiry_date,
            issue_place: draft.issue_place,
            issue_authority: draft.issue_authority,
            attachment: draft.attachment,
            notes: draft.notes,
            active: true,
        }
    }

    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| expiry.signed_duration_since(today).num_days())
    }

    pub fn status(&self, alert_days: u32, today: NaiveDate) -> DocumentStatus {
        DocumentStatus::classify(self.days_remaining(today), alert_days)
    }
}

/// Validated document fields ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDocumentDraft {
    pub employee: EmployeeId,
    pub document_type: DocumentTypeId,
    pub name: String,
    pub number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub issue_place: Option<String>,
    pub issue_authority: Option<String>,
    pub attachment: Option<AttachmentRef>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Valid,
    Expiring,
    Expired,
}

impl DocumentStatus {
    /// A document without an expiry date is always valid.
    pub fn classify(days_remaining: Option<i64>, alert_days: u32) -> Self {
        match days_remaining {
            None => Self::Valid,
            Some(days) if days < 0 => Self::Expired,
            Some(days) if days <= i64::from(alert_days) => Self::Expiring,
            Some(_) => Self::Valid,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Expiring => "Expiring Soon",
            Self::Expired => "Expired",
        }
    }
}

/// Errors raised by catalog, capture, and renewal operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("expected exactly one target document, found {found}")]
    TargetCount { found: usize },
    #[error("required field missing: {field}")]
    RequiredField { field: &'static str },
    #[error("issue date {issue_date} cannot be after expiry date {expiry_date}")]
    IssueAfterExpiry {
        issue_date: NaiveDate,
        expiry_date: NaiveDate,
    },
    #[error("unknown document type {0}")]
    UnknownType(DocumentTypeId),
    #[error("document type {0} is inactive")]
    InactiveType(DocumentTypeId),
    #[error("document {0} not found")]
    NotFound(DocumentId),
    #[error(transparent)]
    Repository(#[from] crate::storage::RepositoryError),
}

impl DocumentError {
    /// True for failures caused by the caller's input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TargetCount { .. }
                | Self::RequiredField { .. }
                | Self::IssueAfterExpiry { .. }
                | Self::UnknownType(_)
                | Self::InactiveType(_)
        )
    }
}

pub fn check_dates(
    issue_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
) -> Result<(), DocumentError> {
    match (issue_date, expiry_date) {
        (Some(issue_date), Some(expiry_date)) if issue_date > expiry_date => {
            Err(DocumentError::IssueAfterExpiry {
                issue_date,
                expiry_date,
            })
        }
        _ => Ok(()),
    }
}
