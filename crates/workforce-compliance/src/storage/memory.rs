use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::RepositoryError;
use crate::workflows::documents::alerts::{AlertId, ExpiryAlert, ExpiryAlertDraft};
use crate::workflows::documents::domain::{
    DocumentId, DocumentType, DocumentTypeDraft, DocumentTypeId, EmployeeDocument,
    EmployeeDocumentDraft,
};
use crate::workflows::documents::repository::{
    AlertRepository, DocumentQuery, DocumentRepository, DocumentTypeRepository,
};
use crate::workflows::signatures::domain::{
    AuditEntryDraft, AuditEntryId, NewSignatureRequest, NewSigner, SignatureAuditEntry,
    SignatureRequest, SignatureRequestId, Signer, SignerId,
};
use crate::workflows::signatures::repository::SignatureStore;

#[derive(Default)]
struct CatalogState {
    next_id: u64,
    types: BTreeMap<DocumentTypeId, DocumentType>,
}

impl CatalogState {
    fn name_taken(&self, name: &str, except: Option<DocumentTypeId>) -> bool {
        self.types
            .values()
            .any(|existing| {
                Some(existing.id) != except && existing.name.eq_ignore_ascii_case(name.trim())
            })
    }
}

/// Document type catalog held in process memory.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl DocumentTypeRepository for InMemoryCatalog {
    fn insert(&self, draft: DocumentTypeDraft) -> Result<DocumentType, RepositoryError> {
        let mut guard = self.state.lock().expect("catalog mutex poisoned");
        if guard.name_taken(&draft.name, None) {
            return Err(RepositoryError::Conflict(draft.name));
        }
        guard.next_id += 1;
        let document_type = DocumentType::new(DocumentTypeId(guard.next_id), draft);
        guard
            .types
            .insert(document_type.id, document_type.clone());
        Ok(document_type)
    }

    fn update(&self, document_type: DocumentType) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("catalog mutex poisoned");
        if !guard.types.contains_key(&document_type.id) {
            return Err(RepositoryError::NotFound);
        }
        if guard.name_taken(&document_type.name, Some(document_type.id)) {
            return Err(RepositoryError::Conflict(document_type.name));
        }
        guard.types.insert(document_type.id, document_type);
        Ok(())
    }

    fn fetch(&self, id: DocumentTypeId) -> Result<Option<DocumentType>, RepositoryError> {
        let guard = self.state.lock().expect("catalog mutex poisoned");
        Ok(guard.types.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<DocumentType>, RepositoryError> {
        let guard = self.state.lock().expect("catalog mutex poisoned");
        let mut types: Vec<DocumentType> = guard.types.values().cloned().collect();
        types.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)));
        Ok(types)
    }
}

#[derive(Default)]
struct DocumentState {
    next_id: u64,
    documents: BTreeMap<DocumentId, EmployeeDocument>,
}

/// Employee documents held in process memory, ordered by id.
#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    state: Arc<Mutex<DocumentState>>,
}

impl DocumentRepository for InMemoryDocumentStore {
    fn insert(&self, draft: EmployeeDocumentDraft) -> Result<EmployeeDocument, RepositoryError> {
        let mut guard = self.state.lock().expect("document mutex poisoned");
        guard.next_id += 1;
        let document = EmployeeDocument::new(DocumentId(guard.next_id), draft);
        guard.documents.insert(document.id, document.clone());
        Ok(document)
    }

    fn modify<F, E>(&self, id: DocumentId, change: F) -> Result<EmployeeDocument, E>
    where
        F: FnOnce(&mut EmployeeDocument) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.state.lock().expect("document mutex poisoned");
        let slot = guard
            .documents
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        let mut updated = slot.clone();
        change(&mut updated)?;
        *slot = updated.clone();
        Ok(updated)
    }

    fn fetch(&self, id: DocumentId) -> Result<Option<EmployeeDocument>, RepositoryError> {
        let guard = self.state.lock().expect("document mutex poisoned");
        Ok(guard.documents.get(&id).cloned())
    }

    fn find(&self, query: &DocumentQuery) -> Result<Vec<EmployeeDocument>, RepositoryError> {
        let guard = self.state.lock().expect("document mutex poisoned");
        Ok(guard
            .documents
            .values()
            .filter(|document| query.matches(document))
            .cloned()
            .collect())
    }

    fn active_snapshot(&self) -> Result<Vec<EmployeeDocument>, RepositoryError> {
        let guard = self.state.lock().expect("document mutex poisoned");
        Ok(guard
            .documents
            .values()
            .filter(|document| document.active)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct AlertTable {
    next_id: u64,
    alerts: BTreeMap<AlertId, ExpiryAlert>,
}

/// Expiry alerts held in process memory.
#[derive(Default, Clone)]
pub struct InMemoryAlertStore {
    state: Arc<Mutex<AlertTable>>,
}

impl AlertRepository for InMemoryAlertStore {
    fn insert(&self, draft: ExpiryAlertDraft) -> Result<ExpiryAlert, RepositoryError> {
        let mut guard = self.state.lock().expect("alert mutex poisoned");
        let duplicate = guard
            .alerts
            .values()
            .any(|alert| alert.document == draft.document && alert.expiry_date == draft.expiry_date);
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "alert for {} expiring {}",
                draft.document, draft.expiry_date
            )));
        }
        guard.next_id += 1;
        let alert = ExpiryAlert::new(AlertId(guard.next_id), draft);
        guard.alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    fn update(&self, alert: ExpiryAlert) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("alert mutex poisoned");
        match guard.alerts.get_mut(&alert.id) {
            Some(slot) => {
                *slot = alert;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: AlertId) -> Result<Option<ExpiryAlert>, RepositoryError> {
        let guard = self.state.lock().expect("alert mutex poisoned");
        Ok(guard.alerts.get(&id).cloned())
    }

    fn find_for(
        &self,
        document: DocumentId,
        expiry_date: NaiveDate,
    ) -> Result<Option<ExpiryAlert>, RepositoryError> {
        let guard = self.state.lock().expect("alert mutex poisoned");
        Ok(guard
            .alerts
            .values()
            .find(|alert| alert.document == document && alert.expiry_date == expiry_date)
            .cloned())
    }

    fn list(&self) -> Result<Vec<ExpiryAlert>, RepositoryError> {
        let guard = self.state.lock().expect("alert mutex poisoned");
        Ok(guard.alerts.values().cloned().collect())
    }
}

#[derive(Default)]
struct SignatureState {
    next_request: u64,
    next_signer: u64,
    next_entry: u64,
    requests: BTreeMap<SignatureRequestId, SignatureRequest>,
    signers: BTreeMap<SignerId, Signer>,
    entries: Vec<SignatureAuditEntry>,
}

/// Signature requests, signers, and the audit log held in process memory.
///
/// Entry ids are never reused, so insertion order survives cascading deletes.
#[derive(Default, Clone)]
pub struct InMemorySignatureStore {
    state: Arc<Mutex<SignatureState>>,
}

impl SignatureStore for InMemorySignatureStore {
    fn create_request(
        &self,
        request: NewSignatureRequest,
    ) -> Result<SignatureRequest, RepositoryError> {
        let mut guard = self.state.lock().expect("signature mutex poisoned");
        guard.next_request += 1;
        let stored = SignatureRequest {
            id: SignatureRequestId(guard.next_request),
            reference: request.reference,
            document_name: request.document_name,
        };
        guard.requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn fetch_request(
        &self,
        id: SignatureRequestId,
    ) -> Result<Option<SignatureRequest>, RepositoryError> {
        let guard = self.state.lock().expect("signature mutex poisoned");
        Ok(guard.requests.get(&id).cloned())
    }

    fn delete_request(&self, id: SignatureRequestId) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("signature mutex poisoned");
        if guard.requests.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        let removed: Vec<SignerId> = guard
            .signers
            .values()
            .filter(|signer| signer.request == id)
            .map(|signer| signer.id)
            .collect();
        guard.signers.retain(|_, signer| signer.request != id);
        guard.entries.retain(|entry| entry.request != id);
        for entry in guard.entries.iter_mut() {
            if entry.signer.is_some_and(|signer| removed.contains(&signer)) {
                entry.signer = None;
            }
        }
        Ok(())
    }

    fn add_signer(
        &self,
        request: SignatureRequestId,
        signer: NewSigner,
    ) -> Result<Signer, RepositoryError> {
        let mut guard = self.state.lock().expect("signature mutex poisoned");
        if !guard.requests.contains_key(&request) {
            return Err(RepositoryError::NotFound);
        }
        guard.next_signer += 1;
        let stored = Signer {
            id: SignerId(guard.next_signer),
            request,
            name: signer.name,
            email: signer.email,
        };
        guard.signers.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn fetch_signer(&self, id: SignerId) -> Result<Option<Signer>, RepositoryError> {
        let guard = self.state.lock().expect("signature mutex poisoned");
        Ok(guard.signers.get(&id).cloned())
    }

    fn delete_signer(&self, id: SignerId) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("signature mutex poisoned");
        if guard.signers.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        for entry in guard.entries.iter_mut() {
            if entry.signer == Some(id) {
                entry.signer = None;
            }
        }
        Ok(())
    }

    fn append_entry(&self, entry: AuditEntryDraft) -> Result<SignatureAuditEntry, RepositoryError> {
        let mut guard = self.state.lock().expect("signature mutex poisoned");
        if !guard.requests.contains_key(&entry.request) {
            return Err(RepositoryError::NotFound);
        }
        guard.next_entry += 1;
        let stored = SignatureAuditEntry::new(AuditEntryId(guard.next_entry), entry);
        guard.entries.push(stored.clone());
        Ok(stored)
    }

    fn entries(
        &self,
        request: SignatureRequestId,
    ) -> Result<Vec<SignatureAuditEntry>, RepositoryError> {
        let guard = self.state.lock().expect("signature mutex poisoned");
        Ok(guard
            .entries
            .iter()
            .filter(|entry| entry.request == request)
            .cloned()
            .collect())
    }
}
