mod config;

pub use config::EligibilityPolicy;

use serde::{Deserialize, Serialize};

use super::domain::{PublicationMode, UserSnapshot};
use super::scoring::TrustScore;

/// Capability flags derived from a snapshot and its trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub has_min_trust_for_basic: bool,
    pub has_min_trust_for_regular: bool,
    pub has_min_trust_for_automatic: bool,
    pub can_create_more_gigs: bool,
    pub can_use_create: bool,
    pub can_use_regular: bool,
    pub can_use_automatic: bool,
    pub overlays: BlockingOverlays,
}

impl Eligibility {
    pub fn allows(&self, mode: PublicationMode) -> bool {
        match mode {
            PublicationMode::Create => self.can_use_create,
            PublicationMode::Regular => self.can_use_regular,
            PublicationMode::Automatic => self.can_use_automatic,
        }
    }

    pub fn available_modes(&self) -> Vec<PublicationMode> {
        PublicationMode::ALL
            .into_iter()
            .filter(|mode| self.allows(*mode))
            .collect()
    }
}

/// Display hints explaining why access is blocked. Not consulted by any gating logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingOverlays {
    pub gig_limit_reached: bool,
    pub unverified: bool,
    pub low_trust: bool,
    pub grace_period_expired: bool,
    pub profile_incomplete: bool,
}

impl BlockingOverlays {
    pub fn any(&self) -> bool {
        self.gig_limit_reached
            || self.unverified
            || self.low_trust
            || self.grace_period_expired
            || self.profile_incomplete
    }

    /// User-facing notices for the active overlays, in display order.
    pub fn notices(&self) -> Vec<&'static str> {
        let mut notices = Vec::new();
        if self.unverified {
            notices.push("Verify your account to publish gigs");
        }
        if self.profile_incomplete {
            notices.push("Complete your profile to publish gigs");
        }
        if self.low_trust {
            notices.push("Your trust score is too low to publish gigs");
        }
        if self.grace_period_expired {
            notices.push("Your free grace period has ended; upgrade to keep publishing");
        }
        if self.gig_limit_reached {
            notices.push("You have reached the free plan gig limit");
        }
        notices
    }
}

impl EligibilityPolicy {
    pub fn evaluate(
        &self,
        snapshot: &UserSnapshot,
        score: TrustScore,
        in_grace_period: bool,
        existing_gig_count: usize,
    ) -> Eligibility {
        let score = score.value();
        let paid = snapshot.tier.is_paid();
        let pro = snapshot.tier.includes_pro_features();
        let verified = snapshot.verified;
        let profile_complete = snapshot.profile_complete;

        let has_min_trust_for_basic = score >= self.min_trust_basic;
        let has_min_trust_for_regular = score >= self.min_trust_regular;
        let has_min_trust_for_automatic = score >= self.min_trust_automatic;
        let can_create_more_gigs = paid || existing_gig_count < self.free_tier_gig_limit;

        let base = verified && can_create_more_gigs && profile_complete;

        let can_use_create = base && has_min_trust_for_basic && (paid || in_grace_period);
        let can_use_regular = base && pro && has_min_trust_for_regular;
        let can_use_automatic = base && pro && has_min_trust_for_automatic;

        let overlays = BlockingOverlays {
            gig_limit_reached: !can_create_more_gigs,
            unverified: !verified,
            low_trust: verified && !has_min_trust_for_basic,
            grace_period_expired: !paid && !in_grace_period,
            profile_incomplete: !profile_complete,
        };

        Eligibility {
            has_min_trust_for_basic,
            has_min_trust_for_regular,
            has_min_trust_for_automatic,
            can_create_more_gigs,
            can_use_create,
            can_use_regular,
            can_use_automatic,
            overlays,
        }
    }
}
