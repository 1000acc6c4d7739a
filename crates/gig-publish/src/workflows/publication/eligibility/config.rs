use serde::{Deserialize, Serialize};

/// Thresholds and limits applied when deriving eligibility flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub min_trust_basic: u8,
    pub min_trust_regular: u8,
    pub min_trust_automatic: u8,
    /// Gigs a free account may own before further publication is blocked.
    pub free_tier_gig_limit: usize,
}

impl EligibilityPolicy {
    pub const DEFAULT_MIN_TRUST_BASIC: u8 = 10;
    pub const DEFAULT_MIN_TRUST_REGULAR: u8 = 40;
    pub const DEFAULT_MIN_TRUST_AUTOMATIC: u8 = 60;
    pub const DEFAULT_FREE_TIER_GIG_LIMIT: usize = 3;
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            min_trust_basic: Self::DEFAULT_MIN_TRUST_BASIC,
            min_trust_regular: Self::DEFAULT_MIN_TRUST_REGULAR,
            min_trust_automatic: Self::DEFAULT_MIN_TRUST_AUTOMATIC,
            free_tier_gig_limit: Self::DEFAULT_FREE_TIER_GIG_LIMIT,
        }
    }
}
