use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use workforce_compliance::context::RequestContext;
use workforce_compliance::storage::InMemorySignatureStore;
use workforce_compliance::workflows::signatures::{
    lifecycle_violations, AuditRecord, NewSignatureRequest, NewSigner, SignatureAction,
    SignatureService,
};

#[test]
fn full_signing_round_is_recorded_in_reverse_order() {
    let store = Arc::new(InMemorySignatureStore::default());
    let service = SignatureService::new(store);
    let start = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
    let at = |minutes: i64| RequestContext::at("contracts.bot", start + Duration::minutes(minutes));

    let request = service
        .open_request(
            &at(0),
            NewSignatureRequest {
                reference: "SR-2025-0042".to_string(),
                document_name: "Employment Contract - E-500".to_string(),
            },
        )
        .expect("request opens");
    let signer = service
        .add_signer(
            request.id,
            NewSigner {
                name: "Mariam".to_string(),
                email: "mariam@example.com".to_string(),
            },
        )
        .expect("signer added");

    let trail = service.trail();
    for (minute, action) in [
        (1, SignatureAction::Sent),
        (30, SignatureAction::Viewed),
        (32, SignatureAction::Signed),
        (33, SignatureAction::Completed),
    ] {
        trail
            .record(
                &at(minute),
                AuditRecord::new(request.id, action)
                    .signer(signer.id)
                    .client("192.0.2.10", "Mozilla/5.0"),
            )
            .expect("entry recorded");
    }

    let entries = trail.entries_for(request.id).expect("entries");
    let actions: Vec<&str> = entries.iter().map(|entry| entry.action.label()).collect();
    assert_eq!(
        actions,
        vec!["Completed", "Signed", "Viewed", "Sent", "Created"]
    );
    assert!(entries
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    assert!(lifecycle_violations(&entries).is_empty());

    service
        .remove_signer(&at(40), signer.id)
        .expect("signer removed");
    let entries = trail.entries_for(request.id).expect("entries");
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|entry| entry.signer.is_none()));
}
