use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use super::domain::{DocumentId, DocumentType, EmployeeId};
use super::repository::{DocumentRepository, DocumentTypeRepository};
use super::service::{DocumentRegistry, NewEmployeeDocument};
use crate::context::RequestContext;
use crate::storage::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read document export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document CSV header: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Row-level failure; the rest of the batch is still imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: Vec<DocumentId>,
    pub failures: Vec<ImportFailure>,
}

/// Bulk capture of employee documents from a CSV export.
pub struct DocumentImporter;

impl DocumentImporter {
    pub fn from_path<P, T, D>(
        path: P,
        registry: &DocumentRegistry<T, D>,
        ctx: &RequestContext,
    ) -> Result<ImportReport, ImportError>
    where
        P: AsRef<Path>,
        T: DocumentTypeRepository + 'static,
        D: DocumentRepository + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, registry, ctx)
    }

    pub fn from_reader<R, T, D>(
        reader: R,
        registry: &DocumentRegistry<T, D>,
        ctx: &RequestContext,
    ) -> Result<ImportReport, ImportError>
    where
        R: Read,
        T: DocumentTypeRepository + 'static,
        D: DocumentRepository + 'static,
    {
        let catalog: Vec<DocumentType> = registry
            .catalog()?
            .into_iter()
            .filter(|document_type| document_type.active)
            .collect();

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        // Surface a malformed header as a batch failure rather than per-row noise.
        csv_reader.headers()?;

        let mut report = ImportReport::default();
        for (index, row) in csv_reader.deserialize::<DocumentRow>().enumerate() {
            // Header is line 1.
            let line = index as u64 + 2;
            let outcome = row
                .map_err(|err| err.to_string())
                .and_then(|row| row.into_document(&catalog))
                .and_then(|input| registry.capture(ctx, input).map_err(|err| err.to_string()));

            match outcome {
                Ok(document) => report.created.push(document.id),
                Err(reason) => {
                    warn!(line, %reason, "skipping document import row");
                    report.failures.push(ImportFailure { line, reason });
                }
            }
        }

        info!(
            created = report.created.len(),
            failed = report.failures.len(),
            "document import finished"
        );
        Ok(report)
    }
}

#[derive(Debug, Deserialize)]
struct DocumentRow {
    #[serde(rename = "Employee")]
    employee: String,
    #[serde(rename = "Document Type")]
    document_type: String,
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Number", default, deserialize_with = "empty_string_as_none")]
    number: Option<String>,
    #[serde(rename = "Issue Date", default, deserialize_with = "empty_string_as_none")]
    issue_date: Option<String>,
    #[serde(rename = "Expiry Date", default, deserialize_with = "empty_string_as_none")]
    expiry_date: Option<String>,
    #[serde(rename = "Notes", default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

impl DocumentRow {
    fn into_document(self, catalog: &[DocumentType]) -> Result<NewEmployeeDocument, String> {
        if self.employee.is_empty() {
            return Err("employee is required".to_string());
        }
        let document_type = catalog
            .iter()
            .find(|document_type| document_type.matches_label(&self.document_type))
            .ok_or_else(|| format!("unknown document type '{}'", self.document_type))?;

        Ok(NewEmployeeDocument {
            employee: EmployeeId(self.employee),
            document_type: document_type.id,
            name: self.name,
            number: self.number,
            issue_date: self.issue_date.as_deref().map(parse_date).transpose()?,
            expiry_date: self.expiry_date.as_deref().map(parse_date).transpose()?,
            issue_place: None,
            issue_authority: None,
            attachment: None,
            notes: self.notes,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{value}' as YYYY-MM-DD ({err})"))
}
