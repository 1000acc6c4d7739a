use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::publication::domain::{
    ActivitySignals, ContentSignals, GigSummary, PenaltySignals, ProfileSignals,
    PublicationRequest, QualitySignals, SocialSignals, SubscriptionTier, UserId, UserSnapshot,
};
use crate::workflows::publication::eligibility::EligibilityPolicy;
use crate::workflows::publication::provider::{
    ProviderError, PublicationContextProvider, PublicationSink, SinkError,
};
use crate::workflows::publication::service::PublicationService;

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn today() -> NaiveDate {
    now().date_naive()
}

/// Verified Pro seller whose signals add up to a trust score of 88.
pub(crate) fn snapshot(suffix: &str) -> UserSnapshot {
    UserSnapshot {
        user_id: UserId(format!("seller-{suffix}")),
        verified: true,
        tier: SubscriptionTier::Pro,
        profile_complete: true,
        account_created_on: NaiveDate::from_ymd_opt(2023, 1, 15).expect("valid date"),
        profile: ProfileSignals {
            has_avatar: true,
            has_bio: true,
            skills: vec!["Logo design".to_string(), "Illustration".to_string()],
            portfolio_items: 2,
            phone_verified: true,
        },
        activity: ActivitySignals {
            completed_orders: 10,
            active_days_last_30: 20,
        },
        quality: QualitySignals {
            average_rating: 4.8,
            review_count: 12,
            on_time_delivery_rate: 1.0,
        },
        content: ContentSignals { gigs_posted: 1 },
        social: SocialSignals {
            followers: 25,
            endorsements: 3,
        },
        penalties: PenaltySignals::default(),
    }
}

/// Account created today with no history, which scores at the floor.
pub(crate) fn newcomer(suffix: &str) -> UserSnapshot {
    UserSnapshot {
        user_id: UserId(format!("newcomer-{suffix}")),
        verified: true,
        tier: SubscriptionTier::Free,
        profile_complete: true,
        account_created_on: today(),
        profile: ProfileSignals::default(),
        activity: ActivitySignals::default(),
        quality: QualitySignals::default(),
        content: ContentSignals::default(),
        social: SocialSignals::default(),
        penalties: PenaltySignals::default(),
    }
}

pub(crate) fn free_seller(suffix: &str) -> UserSnapshot {
    let mut snapshot = snapshot(suffix);
    snapshot.tier = SubscriptionTier::Free;
    snapshot
}

pub(crate) fn gigs(count: usize) -> Vec<GigSummary> {
    (0..count)
        .map(|index| GigSummary {
            gig_id: format!("gig-{index}"),
            title: format!("Gig number {index}"),
        })
        .collect()
}

#[derive(Default)]
pub(crate) struct MemoryProvider {
    snapshots: Mutex<HashMap<UserId, Option<UserSnapshot>>>,
    gigs: Mutex<HashMap<UserId, Vec<GigSummary>>>,
    grace: Mutex<HashMap<UserId, bool>>,
}

impl MemoryProvider {
    pub(crate) fn with_user(self, snapshot: UserSnapshot, gig_count: usize, in_grace: bool) -> Self {
        let user_id = snapshot.user_id.clone();
        self.snapshots
            .lock()
            .expect("provider mutex poisoned")
            .insert(user_id.clone(), Some(snapshot));
        self.gigs
            .lock()
            .expect("provider mutex poisoned")
            .insert(user_id.clone(), gigs(gig_count));
        self.grace
            .lock()
            .expect("provider mutex poisoned")
            .insert(user_id, in_grace);
        self
    }

    /// Registers a user whose snapshot query has not resolved yet.
    pub(crate) fn with_pending_user(self, user_id: &str) -> Self {
        let user_id = UserId(user_id.to_string());
        self.snapshots
            .lock()
            .expect("provider mutex poisoned")
            .insert(user_id, None);
        self
    }

    pub(crate) fn set_snapshot(&self, snapshot: UserSnapshot) {
        self.snapshots
            .lock()
            .expect("provider mutex poisoned")
            .insert(snapshot.user_id.clone(), Some(snapshot));
    }
}

impl PublicationContextProvider for MemoryProvider {
    fn user_snapshot(&self, user_id: &UserId) -> Result<Option<UserSnapshot>, ProviderError> {
        self.snapshots
            .lock()
            .expect("provider mutex poisoned")
            .get(user_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownUser(user_id.0.clone()))
    }

    fn existing_gigs(&self, user_id: &UserId) -> Result<Vec<GigSummary>, ProviderError> {
        Ok(self
            .gigs
            .lock()
            .expect("provider mutex poisoned")
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn in_grace_period(&self, user_id: &UserId) -> Result<bool, ProviderError> {
        Ok(self
            .grace
            .lock()
            .expect("provider mutex poisoned")
            .get(user_id)
            .copied()
            .unwrap_or(false))
    }
}

pub(crate) struct UnavailableProvider;

impl PublicationContextProvider for UnavailableProvider {
    fn user_snapshot(&self, _user_id: &UserId) -> Result<Option<UserSnapshot>, ProviderError> {
        Err(ProviderError::Unavailable("backend offline".to_string()))
    }

    fn existing_gigs(&self, _user_id: &UserId) -> Result<Vec<GigSummary>, ProviderError> {
        Err(ProviderError::Unavailable("backend offline".to_string()))
    }

    fn in_grace_period(&self, _user_id: &UserId) -> Result<bool, ProviderError> {
        Err(ProviderError::Unavailable("backend offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct RecordingSink {
    requests: Arc<Mutex<Vec<PublicationRequest>>>,
}

impl RecordingSink {
    pub(crate) fn requests(&self) -> Vec<PublicationRequest> {
        self.requests.lock().expect("sink mutex poisoned").clone()
    }
}

impl PublicationSink for RecordingSink {
    fn publish(&self, request: PublicationRequest) -> Result<(), SinkError> {
        self.requests
            .lock()
            .expect("sink mutex poisoned")
            .push(request);
        Ok(())
    }
}

pub(crate) struct FailingSink;

impl PublicationSink for FailingSink {
    fn publish(&self, _request: PublicationRequest) -> Result<(), SinkError> {
        Err(SinkError::Transport("mutation endpoint timed out".to_string()))
    }
}

pub(crate) fn build_service(
    provider: MemoryProvider,
) -> (
    PublicationService<MemoryProvider, RecordingSink>,
    Arc<MemoryProvider>,
    Arc<RecordingSink>,
) {
    let provider = Arc::new(provider);
    let sink = Arc::new(RecordingSink::default());
    let service =
        PublicationService::new(provider.clone(), sink.clone(), EligibilityPolicy::default());
    (service, provider, sink)
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
