use chrono::NaiveDate;
use gig_publish::workflows::publication::{
    ActivitySignals, ContentSignals, GigSummary, PenaltySignals, ProfileSignals, ProviderError,
    PublicationContextProvider, PublicationRequest, PublicationSink, QualitySignals, SinkError,
    SocialSignals, SubscriptionTier, UserId, UserSnapshot,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone)]
pub(crate) struct SellerAccount {
    pub(crate) snapshot: UserSnapshot,
    pub(crate) gigs: Vec<GigSummary>,
    pub(crate) in_grace_period: bool,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryContextProvider {
    accounts: Arc<Mutex<HashMap<UserId, SellerAccount>>>,
}

impl InMemoryContextProvider {
    pub(crate) fn seeded() -> Self {
        let provider = Self::default();
        for account in sample_accounts() {
            provider.insert(account);
        }
        provider
    }

    pub(crate) fn insert(&self, account: SellerAccount) {
        let mut guard = self.accounts.lock().expect("provider mutex poisoned");
        guard.insert(account.snapshot.user_id.clone(), account);
    }

    /// Appends a gig the way the marketplace store would after a publication lands.
    pub(crate) fn record_gig(&self, user_id: &UserId, gig: GigSummary) {
        let mut guard = self.accounts.lock().expect("provider mutex poisoned");
        if let Some(account) = guard.get_mut(user_id) {
            account.gigs.push(gig);
            account.snapshot.content.gigs_posted += 1;
        }
    }
}

impl PublicationContextProvider for InMemoryContextProvider {
    fn user_snapshot(&self, user_id: &UserId) -> Result<Option<UserSnapshot>, ProviderError> {
        let guard = self.accounts.lock().expect("provider mutex poisoned");
        guard
            .get(user_id)
            .map(|account| Some(account.snapshot.clone()))
            .ok_or_else(|| ProviderError::UnknownUser(user_id.0.clone()))
    }

    fn existing_gigs(&self, user_id: &UserId) -> Result<Vec<GigSummary>, ProviderError> {
        let guard = self.accounts.lock().expect("provider mutex poisoned");
        guard
            .get(user_id)
            .map(|account| account.gigs.clone())
            .ok_or_else(|| ProviderError::UnknownUser(user_id.0.clone()))
    }

    fn in_grace_period(&self, user_id: &UserId) -> Result<bool, ProviderError> {
        let guard = self.accounts.lock().expect("provider mutex poisoned");
        guard
            .get(user_id)
            .map(|account| account.in_grace_period)
            .ok_or_else(|| ProviderError::UnknownUser(user_id.0.clone()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPublicationSink {
    published: Arc<Mutex<Vec<PublicationRequest>>>,
}

impl PublicationSink for InMemoryPublicationSink {
    fn publish(&self, request: PublicationRequest) -> Result<(), SinkError> {
        let mut guard = self.published.lock().expect("sink mutex poisoned");
        guard.push(request);
        Ok(())
    }
}

impl InMemoryPublicationSink {
    pub(crate) fn published(&self) -> Vec<PublicationRequest> {
        self.published.lock().expect("sink mutex poisoned").clone()
    }
}

pub(crate) fn sample_accounts() -> Vec<SellerAccount> {
    let studio = UserSnapshot {
        user_id: UserId("studio-nova".to_string()),
        verified: true,
        tier: SubscriptionTier::Pro,
        profile_complete: true,
        account_created_on: NaiveDate::from_ymd_opt(2022, 4, 12).expect("valid date"),
        profile: ProfileSignals {
            has_avatar: true,
            has_bio: true,
            skills: vec!["Brand identity".to_string(), "Motion design".to_string()],
            portfolio_items: 6,
            phone_verified: true,
        },
        activity: ActivitySignals {
            completed_orders: 42,
            active_days_last_30: 22,
        },
        quality: QualitySignals {
            average_rating: 4.9,
            review_count: 37,
            on_time_delivery_rate: 0.96,
        },
        content: ContentSignals { gigs_posted: 4 },
        social: SocialSignals {
            followers: 180,
            endorsements: 9,
        },
        penalties: PenaltySignals {
            reports_upheld: 0,
            cancellations: 1,
            disputes_lost: 0,
        },
    };

    let newcomer = UserSnapshot {
        user_id: UserId("fresh-writer".to_string()),
        verified: true,
        tier: SubscriptionTier::Free,
        profile_complete: true,
        account_created_on: NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date"),
        profile: ProfileSignals {
            has_avatar: true,
            has_bio: true,
            skills: vec!["Blog posts".to_string()],
            portfolio_items: 1,
            phone_verified: false,
        },
        activity: ActivitySignals {
            completed_orders: 2,
            active_days_last_30: 8,
        },
        quality: QualitySignals {
            average_rating: 4.5,
            review_count: 2,
            on_time_delivery_rate: 1.0,
        },
        content: ContentSignals { gigs_posted: 1 },
        social: SocialSignals::default(),
        penalties: PenaltySignals::default(),
    };

    let unverified = UserSnapshot {
        user_id: UserId("pending-kyc".to_string()),
        verified: false,
        ..newcomer.clone()
    };

    vec![
        SellerAccount {
            snapshot: studio,
            gigs: vec![existing_gig("studio-nova", 1)],
            in_grace_period: false,
        },
        SellerAccount {
            snapshot: newcomer,
            gigs: vec![existing_gig("fresh-writer", 1)],
            in_grace_period: true,
        },
        SellerAccount {
            snapshot: unverified,
            gigs: Vec::new(),
            in_grace_period: true,
        },
    ]
}

fn existing_gig(owner: &str, index: usize) -> GigSummary {
    GigSummary {
        gig_id: format!("{owner}-gig-{index}"),
        title: format!("Sample gig {index}"),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
