use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{
    DocumentCategory, DocumentError, DocumentType, DocumentTypeDraft, DocumentTypeId,
    DEFAULT_ALERT_DAYS, DEFAULT_SEQUENCE,
};
use super::repository::DocumentTypeRepository;
use crate::context::RequestContext;

/// Administrator input for a new catalog entry. Omitted fields take catalog defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocumentType {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub sequence: Option<i32>,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub has_expiry: Option<bool>,
    #[serde(default)]
    pub alert_days: Option<u32>,
    #[serde(default)]
    pub category: DocumentCategory,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a catalog entry. Absent fields are kept; a blank `code` or
/// `description` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTypePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub sequence: Option<i32>,
    #[serde(default)]
    pub is_mandatory: Option<bool>,
    #[serde(default)]
    pub has_expiry: Option<bool>,
    #[serde(default)]
    pub alert_days: Option<u32>,
    #[serde(default)]
    pub category: Option<DocumentCategory>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Administrative operations over the document type catalog.
pub struct CatalogService<T> {
    repository: Arc<T>,
    default_alert_days: u32,
}

impl<T> CatalogService<T>
where
    T: DocumentTypeRepository + 'static,
{
    pub fn new(repository: Arc<T>) -> Self {
        Self::with_default_alert_days(repository, DEFAULT_ALERT_DAYS)
    }

    pub fn with_default_alert_days(repository: Arc<T>, default_alert_days: u32) -> Self {
        Self {
            repository,
            default_alert_days,
        }
    }

    pub fn repository(&self) -> &Arc<T> {
        &self.repository
    }

    /// Register a new type. Duplicate names surface as the store's `Conflict` error.
    pub fn register(
        &self,
        ctx: &RequestContext,
        input: NewDocumentType,
    ) -> Result<DocumentType, DocumentError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DocumentError::RequiredField { field: "name" });
        }

        let draft = DocumentTypeDraft {
            name,
            code: input.code.filter(|code| !code.trim().is_empty()),
            sequence: input.sequence.unwrap_or(DEFAULT_SEQUENCE),
            is_mandatory: input.is_mandatory,
            has_expiry: input.has_expiry.unwrap_or(true),
            alert_days: input.alert_days.unwrap_or(self.default_alert_days),
            category: input.category,
            description: input.description,
        };

        let stored = self.repository.insert(draft)?;
        info!(
            user = %ctx.acting_user,
            document_type = %stored.id,
            name = %stored.name,
            "document type registered"
        );
        Ok(stored)
    }

    pub fn update(
        &self,
        ctx: &RequestContext,
        id: DocumentTypeId,
        patch: DocumentTypePatch,
    ) -> Result<DocumentType, DocumentError> {
        let mut current = self.get(id)?;

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DocumentError::RequiredField { field: "name" });
            }
            current.name = name;
        }
        if let Some(code) = patch.code {
            current.code = Some(code).filter(|code| !code.trim().is_empty());
        }
        if let Some(sequence) = patch.sequence {
            current.sequence = sequence;
        }
        if let Some(is_mandatory) = patch.is_mandatory {
            current.is_mandatory = is_mandatory;
        }
        if let Some(has_expiry) = patch.has_expiry {
            current.has_expiry = has_expiry;
        }
        if let Some(alert_days) = patch.alert_days {
            current.alert_days = alert_days;
        }
        if let Some(category) = patch.category {
            current.category = category;
        }
        if let Some(description) = patch.description {
            current.description = Some(description).filter(|text| !text.trim().is_empty());
        }

        self.repository.update(current.clone())?;
        debug!(user = %ctx.acting_user, document_type = %id, "document type updated");
        Ok(current)
    }

    pub fn deactivate(
        &self,
        ctx: &RequestContext,
        id: DocumentTypeId,
    ) -> Result<DocumentType, DocumentError> {
        let mut current = self.get(id)?;
        current.active = false;
        self.repository.update(current.clone())?;
        info!(user = %ctx.acting_user, document_type = %id, "document type deactivated");
        Ok(current)
    }

    pub fn get(&self, id: DocumentTypeId) -> Result<DocumentType, DocumentError> {
        self.repository
            .fetch(id)?
            .ok_or(DocumentError::UnknownType(id))
    }

    pub fn list(&self, include_inactive: bool) -> Result<Vec<DocumentType>, DocumentError> {
        let mut types = self.repository.list()?;
        if !include_inactive {
            types.retain(|document_type| document_type.active);
        }
        Ok(types)
    }

    /// Insert any standard entry whose name is not already present.
    pub fn seed_standard(&self, ctx: &RequestContext) -> Result<usize, DocumentError> {
        let existing = self.repository.list()?;
        let mut inserted = 0;
        for entry in standard_catalog() {
            if existing
                .iter()
                .any(|document_type| document_type.name.eq_ignore_ascii_case(&entry.name))
            {
                continue;
            }
            self.register(ctx, entry)?;
            inserted += 1;
        }
        Ok(inserted)
    }
}

/// Baseline catalog for UAE employment records.
pub fn standard_catalog() -> Vec<NewDocumentType> {
    fn entry(
        name: &str,
        code: &str,
        sequence: i32,
        category: DocumentCategory,
        is_mandatory: bool,
        has_expiry: bool,
        alert_days: u32,
    ) -> NewDocumentType {
        NewDocumentType {
            name: name.to_string(),
            code: Some(code.to_string()),
            sequence: Some(sequence),
            is_mandatory,
            has_expiry: Some(has_expiry),
            alert_days: Some(alert_days),
            category,
            description: None,
        }
    }

    vec![
        entry("Passport", "PASS", 10, DocumentCategory::Identification, true, true, 90),
        entry("Emirates ID", "EID", 20, DocumentCategory::Identification, true, true, 30),
        entry("Residence Visa", "VISA", 30, DocumentCategory::Visa, true, true, 60),
        entry("Labour Card", "LC", 40, DocumentCategory::Employment, true, true, 30),
        entry("Work Permit", "WP", 50, DocumentCategory::Employment, false, true, 30),
        entry("Medical Fitness", "MED", 60, DocumentCategory::Medical, false, true, 15),
        entry("Degree Certificate", "DEG", 70, DocumentCategory::Education, false, false, 0),
    ]
}
