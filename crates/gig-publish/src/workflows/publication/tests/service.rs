use std::sync::Arc;

use chrono::Duration;

use super::common::*;
use crate::workflows::publication::dispatcher::{DispatchOutcome, SubmissionError};
use crate::workflows::publication::domain::{PublicationMode, SessionId, UserId};
use crate::workflows::publication::eligibility::EligibilityPolicy;
use crate::workflows::publication::flow::{FlowError, FlowView};
use crate::workflows::publication::provider::ProviderError;
use crate::workflows::publication::service::{PublicationService, PublicationServiceError};
use crate::workflows::publication::wizard::{WizardAction, WizardStep};

fn walk_to_confirmation(
    service: &PublicationService<MemoryProvider, RecordingSink>,
    session_id: &SessionId,
    mode: PublicationMode,
) {
    service
        .apply(session_id, WizardAction::Continue, now())
        .expect("to selection");
    service
        .apply(session_id, WizardAction::SelectOption { mode }, now())
        .expect("option chosen");
    service
        .apply(session_id, WizardAction::Continue, now())
        .expect("to confirmation");
}

#[test]
fn open_session_reports_eligibility() {
    let (service, _, _) = build_service(MemoryProvider::default().with_user(snapshot("open"), 1, false));

    let (_, view) = service
        .open_session(UserId("seller-open".to_string()), now())
        .expect("session opens");

    match view {
        FlowView::Ready { report, wizard } => {
            assert_eq!(report.trust.score.value(), 88);
            assert!(report.eligibility.can_use_automatic);
            assert_eq!(wizard.current_step, WizardStep::Eligibility);
            assert!(wizard.active_option.is_none());
        }
        other => panic!("expected ready view, got {other:?}"),
    }
    assert_eq!(service.open_sessions(), 1);
}

#[test]
fn pending_snapshot_renders_loading_until_resolved() {
    let provider = MemoryProvider::default().with_pending_user("seller-pending");
    let (service, provider, _) = build_service(provider);

    let (session_id, view) = service
        .open_session(UserId("seller-pending".to_string()), now())
        .expect("session opens");
    assert!(matches!(view, FlowView::Loading { .. }));

    walk_to_confirmation(&service, &session_id, PublicationMode::Create);
    let submit = service.submit(&session_id, Some(PublicationMode::Create), now());
    assert!(matches!(
        submit,
        Err(PublicationServiceError::Flow(FlowError::Submission(
            SubmissionError::UserUnavailable
        )))
    ));

    provider.set_snapshot({
        let mut snapshot = snapshot("pending");
        snapshot.user_id = UserId("seller-pending".to_string());
        snapshot
    });
    let view = service.view(&session_id, now()).expect("view renders");
    assert!(matches!(view, FlowView::Ready { .. }));
}

#[test]
fn scheduled_submission_dispatches_and_closes_flow() {
    let (service, _, sink) = build_service(MemoryProvider::default().with_user(snapshot("schedule"), 1, false));
    let (session_id, _) = service
        .open_session(UserId("seller-schedule".to_string()), now())
        .expect("session opens");
    walk_to_confirmation(&service, &session_id, PublicationMode::Automatic);

    let rejected = service.submit(&session_id, None, now());
    assert!(matches!(
        rejected,
        Err(PublicationServiceError::Flow(FlowError::Submission(
            SubmissionError::DateRequired
        )))
    ));
    assert!(sink.requests().is_empty());

    let publish_at = now() + Duration::days(7);
    service
        .apply(&session_id, WizardAction::SelectDate { date: publish_at }, now())
        .expect("date chosen");

    let outcome = service.submit(&session_id, None, now()).expect("dispatched");
    assert!(matches!(outcome, DispatchOutcome::Dispatched { .. }));

    let requests = sink.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].mode, PublicationMode::Automatic);
    assert_eq!(requests[0].publish_at, publish_at);

    assert!(matches!(
        service.view(&session_id, now()),
        Err(PublicationServiceError::SessionNotFound(_))
    ));
    assert!(matches!(
        service.submit(&session_id, None, now()),
        Err(PublicationServiceError::SessionNotFound(_))
    ));
    assert_eq!(service.open_sessions(), 0);
}

#[test]
fn dispatched_sessions_are_dropped_from_the_store() {
    let (service, _, sink) = build_service(MemoryProvider::default().with_user(snapshot("cycle"), 0, false));
    let user_id = UserId("seller-cycle".to_string());

    for _ in 0..50 {
        let (session_id, _) = service
            .open_session(user_id.clone(), now())
            .expect("session opens");
        walk_to_confirmation(&service, &session_id, PublicationMode::Regular);
        let outcome = service.submit(&session_id, None, now()).expect("dispatched");
        assert!(matches!(outcome, DispatchOutcome::Dispatched { .. }));
    }

    assert_eq!(sink.requests().len(), 50);
    assert_eq!(service.open_sessions(), 0);
}

#[test]
fn failed_dispatch_keeps_the_session() {
    let (service, _, sink) = build_service(MemoryProvider::default().with_user(snapshot("undated"), 0, false));
    let (session_id, _) = service
        .open_session(UserId("seller-undated".to_string()), now())
        .expect("session opens");
    walk_to_confirmation(&service, &session_id, PublicationMode::Automatic);

    assert!(service.submit(&session_id, None, now()).is_err());

    assert!(sink.requests().is_empty());
    assert_eq!(service.open_sessions(), 1);
    assert!(service.view(&session_id, now()).is_ok());
}

#[test]
fn submit_before_confirmation_is_rejected() {
    let (service, _, sink) = build_service(MemoryProvider::default().with_user(snapshot("early"), 0, false));
    let (session_id, _) = service
        .open_session(UserId("seller-early".to_string()), now())
        .expect("session opens");

    let implicit = service.submit(&session_id, None, now());
    let explicit = service.submit(&session_id, Some(PublicationMode::Create), now());

    for result in [implicit, explicit] {
        assert!(matches!(
            result,
            Err(PublicationServiceError::Flow(FlowError::NotConfirmed {
                step: WizardStep::Eligibility
            }))
        ));
    }

    service
        .apply(&session_id, WizardAction::Continue, now())
        .expect("to selection");
    service
        .apply(
            &session_id,
            WizardAction::SelectOption {
                mode: PublicationMode::Create,
            },
            now(),
        )
        .expect("option chosen");
    let from_selection = service.submit(&session_id, None, now());
    assert!(matches!(
        from_selection,
        Err(PublicationServiceError::Flow(FlowError::NotConfirmed {
            step: WizardStep::Selection
        }))
    ));

    assert!(sink.requests().is_empty());
    assert_eq!(service.open_sessions(), 1);
}

#[test]
fn submitted_mode_must_match_confirmed_option() {
    let (service, _, sink) = build_service(MemoryProvider::default().with_user(snapshot("mismatch"), 0, false));
    let (session_id, _) = service
        .open_session(UserId("seller-mismatch".to_string()), now())
        .expect("session opens");
    walk_to_confirmation(&service, &session_id, PublicationMode::Regular);

    let result = service.submit(&session_id, Some(PublicationMode::Create), now());

    assert!(matches!(
        result,
        Err(PublicationServiceError::Flow(FlowError::ModeMismatch {
            requested: PublicationMode::Create,
            selected: PublicationMode::Regular,
        }))
    ));
    assert!(sink.requests().is_empty());

    let outcome = service
        .submit(&session_id, Some(PublicationMode::Regular), now())
        .expect("matching mode dispatches");
    assert!(matches!(outcome, DispatchOutcome::Dispatched { .. }));
}

#[test]
fn reopening_starts_from_a_fresh_wizard() {
    let (service, _, _) = build_service(MemoryProvider::default().with_user(snapshot("reopen"), 0, false));
    let user_id = UserId("seller-reopen".to_string());

    let (first, _) = service
        .open_session(user_id.clone(), now())
        .expect("session opens");
    walk_to_confirmation(&service, &first, PublicationMode::Regular);
    service.close_session(&first);

    let (second, view) = service.open_session(user_id, now()).expect("reopens");

    assert_ne!(first, second);
    match view {
        FlowView::Ready { wizard, .. } => {
            assert_eq!(wizard.current_step, WizardStep::Eligibility);
            assert!(wizard.active_option.is_none());
        }
        other => panic!("expected ready view, got {other:?}"),
    }
    assert!(matches!(
        service.view(&first, now()),
        Err(PublicationServiceError::SessionNotFound(_))
    ));
}

#[test]
fn wizard_guard_errors_propagate() {
    let (service, _, _) = build_service(MemoryProvider::default().with_user(snapshot("guard"), 0, false));
    let (session_id, _) = service
        .open_session(UserId("seller-guard".to_string()), now())
        .expect("session opens");

    let result = service.apply(
        &session_id,
        WizardAction::JumpTo {
            step: WizardStep::Confirmation,
        },
        now(),
    );

    assert!(matches!(
        result,
        Err(PublicationServiceError::Flow(FlowError::Wizard(_)))
    ));
}

#[test]
fn eligibility_lookup_reflects_gig_limit() {
    let (service, _, _) =
        build_service(MemoryProvider::default().with_user(free_seller("lookup"), 3, false));

    let report = service
        .eligibility(&UserId("seller-lookup".to_string()), now())
        .expect("report builds");

    assert_eq!(report.existing_gig_count, 3);
    assert!(!report.in_grace_period);
    assert!(!report.eligibility.can_create_more_gigs);
    assert!(report.available_modes.is_empty());
    assert!(report.eligibility.overlays.gig_limit_reached);
}

#[test]
fn unknown_user_cannot_open_a_flow() {
    let (service, _, _) = build_service(MemoryProvider::default());

    let result = service.open_session(UserId("ghost".to_string()), now());

    assert!(matches!(
        result,
        Err(PublicationServiceError::Provider(ProviderError::UnknownUser(_)))
    ));
    assert_eq!(service.open_sessions(), 0);
}

#[test]
fn provider_outage_is_propagated() {
    let service = PublicationService::new(
        Arc::new(UnavailableProvider),
        Arc::new(RecordingSink::default()),
        EligibilityPolicy::default(),
    );

    let result = service.eligibility(&UserId("anyone".to_string()), now());

    assert!(matches!(
        result,
        Err(PublicationServiceError::Provider(ProviderError::Unavailable(_)))
    ));
}
