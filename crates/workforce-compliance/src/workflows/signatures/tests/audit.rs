use super::common::*;
use crate::workflows::signatures::audit::lifecycle_violations;
use crate::workflows::signatures::domain::AuditEntryDraft;
use crate::workflows::signatures::{
    AuditError, AuditRecord, SignatureAction, SignatureRequestId, SignatureStore, SignerId,
};

#[test]
fn opening_a_request_records_created() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-001");

    let entries = service.trail().entries_for(request.id).expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, SignatureAction::Created);
    assert_eq!(entries[0].acting_user.to_string(), "sign.desk");
    assert!(entries[0]
        .description
        .as_deref()
        .unwrap_or_default()
        .contains("SR-001"));
}

#[test]
fn record_against_unknown_request_is_a_reference_error() {
    let (service, _) = build_service();
    let err = service
        .trail()
        .record(
            &ctx_at(1),
            AuditRecord::new(SignatureRequestId(42), SignatureAction::Sent),
        )
        .expect_err("unknown request");
    assert!(matches!(err, AuditError::Reference(SignatureRequestId(42))));
}

#[test]
fn entries_list_most_recent_first_and_are_repeatable() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-002");
    let signer = add_signer(&service, &request, "Amal");

    service
        .trail()
        .record(&ctx_at(5), AuditRecord::new(request.id, SignatureAction::Sent))
        .expect("sent");
    service
        .trail()
        .record(
            &ctx_at(9),
            AuditRecord::new(request.id, SignatureAction::Viewed)
                .signer(signer.id)
                .client("10.0.0.8", "Mozilla/5.0"),
        )
        .expect("viewed");

    let first = service.trail().entries_for(request.id).expect("entries");
    let actions: Vec<_> = first.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![
            SignatureAction::Viewed,
            SignatureAction::Sent,
            SignatureAction::Created
        ]
    );
    assert_eq!(first[0].signer, Some(signer.id));
    assert_eq!(first[0].ip_address.as_deref(), Some("10.0.0.8"));

    let second = service.trail().entries_for(request.id).expect("entries");
    assert_eq!(first, second);
}

#[test]
fn equal_timestamps_list_later_insert_first() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-003");

    let sent = service
        .trail()
        .record(&ctx_at(3), AuditRecord::new(request.id, SignatureAction::Sent))
        .expect("sent");
    let reminder = service
        .trail()
        .record(&ctx_at(3), AuditRecord::new(request.id, SignatureAction::Reminder))
        .expect("reminder");

    let entries = service.trail().entries_for(request.id).expect("entries");
    assert_eq!(entries[0].id, reminder.id);
    assert_eq!(entries[1].id, sent.id);
}

#[test]
fn unknown_signer_is_recorded_without_a_signer() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-004");

    let entry = service
        .trail()
        .record(
            &ctx_at(2),
            AuditRecord::new(request.id, SignatureAction::Viewed).signer(SignerId(99)),
        )
        .expect("recorded");
    assert_eq!(entry.signer, None);
}

#[test]
fn deleting_a_request_cascades_to_its_entries() {
    let (service, store) = build_service();
    let request = open_request(&service, "SR-005");
    let other = open_request(&service, "SR-006");
    let signer = add_signer(&service, &request, "Omar");
    service
        .trail()
        .record(&ctx_at(4), AuditRecord::new(request.id, SignatureAction::Sent))
        .expect("sent");

    service
        .remove_request(&ctx_at(10), request.id)
        .expect("request removed");

    assert!(store.entries(request.id).expect("entries").is_empty());
    assert!(store.fetch_signer(signer.id).expect("fetch").is_none());
    assert_eq!(store.entries(other.id).expect("entries").len(), 1);

    let err = service
        .trail()
        .record(&ctx_at(11), AuditRecord::new(request.id, SignatureAction::Viewed))
        .expect_err("request gone");
    assert!(matches!(err, AuditError::Reference(_)));
}

#[test]
fn deleting_a_signer_clears_it_from_entries() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-007");
    let signer = add_signer(&service, &request, "Layla");
    service
        .trail()
        .record(
            &ctx_at(6),
            AuditRecord::new(request.id, SignatureAction::Signed).signer(signer.id),
        )
        .expect("signed");

    service
        .remove_signer(&ctx_at(7), signer.id)
        .expect("signer removed");

    let entries = service.trail().entries_for(request.id).expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, SignatureAction::Signed);
    assert_eq!(entries[0].signer, None);
}

#[test]
fn adding_a_signer_to_unknown_request_fails() {
    let (service, _) = build_service();
    let err = service
        .add_signer(
            SignatureRequestId(5),
            crate::workflows::signatures::NewSigner {
                name: "Noor".to_string(),
                email: "noor@example.com".to_string(),
            },
        )
        .expect_err("unknown request");
    assert!(matches!(err, AuditError::Reference(SignatureRequestId(5))));
}

#[test]
fn well_behaved_lifecycle_has_no_violations() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-008");
    let trail = service.trail();
    for (minute, action) in [
        (1, SignatureAction::Sent),
        (2, SignatureAction::Viewed),
        (3, SignatureAction::Signed),
        (4, SignatureAction::Completed),
        (5, SignatureAction::Reset),
        (6, SignatureAction::Sent),
        (7, SignatureAction::Cancelled),
    ] {
        trail
            .record(&ctx_at(minute), AuditRecord::new(request.id, action))
            .expect("recorded");
    }

    let entries = trail.entries_for(request.id).expect("entries");
    assert!(lifecycle_violations(&entries).is_empty());
}

#[test]
fn action_after_terminal_state_is_flagged() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-009");
    let trail = service.trail();
    trail
        .record(&ctx_at(1), AuditRecord::new(request.id, SignatureAction::Declined))
        .expect("declined");
    let late = trail
        .record(&ctx_at(2), AuditRecord::new(request.id, SignatureAction::Reminder))
        .expect("reminder");

    let violations = lifecycle_violations(&trail.entries_for(request.id).expect("entries"));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].entry, late.id);
    assert_eq!(violations[0].terminal, SignatureAction::Declined);
    assert_eq!(violations[0].action, SignatureAction::Reminder);
}

#[test]
fn signer_of_another_request_is_recorded_without_a_signer() {
    let (service, _) = build_service();
    let request = open_request(&service, "SR-010");
    let other = open_request(&service, "SR-011");
    let foreign = add_signer(&service, &other, "Hessa");

    let entry = service
        .trail()
        .record(
            &ctx_at(2),
            AuditRecord::new(request.id, SignatureAction::Signed).signer(foreign.id),
        )
        .expect("recorded");
    assert_eq!(entry.signer, None);

    service
        .remove_request(&ctx_at(3), other.id)
        .expect("other request removed");
    let entries = service.trail().entries_for(request.id).expect("entries");
    assert!(entries.iter().all(|entry| entry.signer.is_none()));
}

#[test]
fn deleting_a_request_clears_its_signers_from_other_entries() {
    let (service, store) = build_service();
    let request = open_request(&service, "SR-012");
    let other = open_request(&service, "SR-013");
    let foreign = add_signer(&service, &other, "Rashid");

    let ctx = ctx_at(4);
    let stored = store
        .append_entry(AuditEntryDraft {
            request: request.id,
            signer: Some(foreign.id),
            timestamp: ctx.now,
            action: SignatureAction::Viewed,
            description: None,
            ip_address: None,
            user_agent: None,
            acting_user: ctx.acting_user.clone(),
        })
        .expect("appended");

    service
        .remove_request(&ctx_at(5), other.id)
        .expect("other request removed");

    let entries = store.entries(request.id).expect("entries");
    let kept = entries
        .iter()
        .find(|entry| entry.id == stored.id)
        .expect("entry survives");
    assert_eq!(kept.signer, None);
}
