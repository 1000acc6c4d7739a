mod rules;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::UserSnapshot;

/// Reputation metric gating publication modes, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustScore(u8);

impl TrustScore {
    pub const MIN: u8 = 5;
    pub const MAX: u8 = 100;
    /// Conservative score used when no snapshot is available or it cannot be scored.
    pub const FALLBACK: TrustScore = TrustScore(10);

    /// Clamps an arbitrary total into the valid range.
    pub fn from_total(total: i64) -> Self {
        let capped = total.min(i64::from(Self::MAX));
        if capped < i64::from(Self::MIN) {
            TrustScore(Self::MIN)
        } else {
            TrustScore(capped as u8)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Per-category contribution behind a trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustBreakdown {
    pub profile: u32,
    pub longevity: u32,
    pub activity: u32,
    pub quality: u32,
    pub content: u32,
    pub social: u32,
    pub penalty: u32,
    /// Earned points minus penalties before clamping.
    pub raw_total: i64,
}

impl TrustBreakdown {
    pub fn score(&self) -> TrustScore {
        TrustScore::from_total(self.raw_total)
    }
}

/// Outcome of scoring a snapshot. `breakdown` is absent when the fallback was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAssessment {
    pub score: TrustScore,
    pub breakdown: Option<TrustBreakdown>,
}

impl TrustAssessment {
    fn fallback() -> Self {
        Self {
            score: TrustScore::FALLBACK,
            breakdown: None,
        }
    }
}

/// Scores a snapshot, falling back to [`TrustScore::FALLBACK`] instead of failing.
pub fn assess_trust(snapshot: Option<&UserSnapshot>, today: NaiveDate) -> TrustAssessment {
    let Some(snapshot) = snapshot else {
        return TrustAssessment::fallback();
    };

    match rules::score_snapshot(snapshot, today) {
        Ok(breakdown) => TrustAssessment {
            score: breakdown.score(),
            breakdown: Some(breakdown),
        },
        Err(err) => {
            warn!(user_id = %snapshot.user_id.0, error = %err, "trust score fell back to default");
            TrustAssessment::fallback()
        }
    }
}

pub fn compute_trust_score(snapshot: Option<&UserSnapshot>, today: NaiveDate) -> TrustScore {
    assess_trust(snapshot, today).score
}
