use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::context::RequestContext;
use crate::storage::InMemorySignatureStore;
use crate::workflows::signatures::{
    NewSignatureRequest, NewSigner, SignatureRequest, SignatureService, Signer,
};

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

pub(super) fn ctx_at(minutes: i64) -> RequestContext {
    RequestContext::at("sign.desk", base_time() + Duration::minutes(minutes))
}

pub(super) fn build_service() -> (
    Arc<SignatureService<InMemorySignatureStore>>,
    Arc<InMemorySignatureStore>,
) {
    let store = Arc::new(InMemorySignatureStore::default());
    let service = Arc::new(SignatureService::new(store.clone()));
    (service, store)
}

pub(super) fn open_request(
    service: &SignatureService<InMemorySignatureStore>,
    reference: &str,
) -> SignatureRequest {
    service
        .open_request(
            &ctx_at(0),
            NewSignatureRequest {
                reference: reference.to_string(),
                document_name: "Employment Contract".to_string(),
            },
        )
        .expect("request opens")
}

pub(super) fn add_signer(
    service: &SignatureService<InMemorySignatureStore>,
    request: &SignatureRequest,
    name: &str,
) -> Signer {
    service
        .add_signer(
            request.id,
            NewSigner {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_ascii_lowercase()),
            },
        )
        .expect("signer added")
}
