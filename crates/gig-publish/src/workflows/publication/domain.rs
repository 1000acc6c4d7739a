use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for marketplace accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for open publication flows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Subscription plans offered to sellers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Premium,
    Elite,
}

impl SubscriptionTier {
    /// Any plan other than `Free` counts as paid.
    pub fn is_paid(self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }

    /// Scheduled and draft publication are unlocked from the Pro plan upward.
    pub fn includes_pro_features(self) -> bool {
        matches!(
            self,
            SubscriptionTier::Pro | SubscriptionTier::Premium | SubscriptionTier::Elite
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            SubscriptionTier::Free => "Free",
            SubscriptionTier::Pro => "Pro",
            SubscriptionTier::Premium => "Premium",
            SubscriptionTier::Elite => "Elite",
        }
    }
}

/// How a gig should be published once the flow is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationMode {
    /// Publish immediately.
    Create,
    /// Keep as a draft the seller publishes by hand.
    Regular,
    /// Publish automatically at a scheduled date.
    Automatic,
}

impl PublicationMode {
    pub const ALL: [PublicationMode; 3] = [
        PublicationMode::Create,
        PublicationMode::Regular,
        PublicationMode::Automatic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PublicationMode::Create => "Publish now",
            PublicationMode::Regular => "Save as draft",
            PublicationMode::Automatic => "Schedule publication",
        }
    }
}

/// Point-in-time view of an account, supplied by the backing data store.
///
/// The flow never mutates a snapshot; it is re-read whenever the host refreshes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user_id: UserId,
    pub verified: bool,
    pub tier: SubscriptionTier,
    pub profile_complete: bool,
    pub account_created_on: NaiveDate,
    #[serde(default)]
    pub profile: ProfileSignals,
    #[serde(default)]
    pub activity: ActivitySignals,
    #[serde(default)]
    pub quality: QualitySignals,
    #[serde(default)]
    pub content: ContentSignals,
    #[serde(default)]
    pub social: SocialSignals,
    #[serde(default)]
    pub penalties: PenaltySignals,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSignals {
    pub has_avatar: bool,
    pub has_bio: bool,
    pub skills: Vec<String>,
    pub portfolio_items: u32,
    pub phone_verified: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySignals {
    pub completed_orders: u32,
    pub active_days_last_30: u8,
}

/// Buyer feedback aggregates. `average_rating` is on a 0-5 scale and
/// `on_time_delivery_rate` is a 0-1 fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySignals {
    pub average_rating: f32,
    pub review_count: u32,
    pub on_time_delivery_rate: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSignals {
    pub gigs_posted: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSignals {
    pub followers: u32,
    pub endorsements: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltySignals {
    pub reports_upheld: u32,
    pub cancellations: u32,
    pub disputes_lost: u32,
}

/// Minimal view of a gig the user already owns. Only the count matters to the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GigSummary {
    pub gig_id: String,
    pub title: String,
}

/// Payload handed to the publication sink once a flow is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRequest {
    pub user_id: UserId,
    pub mode: PublicationMode,
    pub publish_at: DateTime<Utc>,
}
