use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{PublicationMode, PublicationRequest, SubscriptionTier, UserSnapshot};
use super::eligibility::EligibilityPolicy;
use super::provider::{PublicationSink, SinkError};
use super::scoring::TrustScore;

/// Inputs re-checked at submission time.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionContext<'a> {
    pub snapshot: Option<&'a UserSnapshot>,
    pub score: TrustScore,
    pub in_grace_period: bool,
    pub existing_gig_count: usize,
    pub selected_date: Option<DateTime<Utc>>,
}

/// Result of a submission attempt that did not fail validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Dispatched { request: PublicationRequest },
    /// Another submission for the same flow is still running; nothing was sent.
    AlreadyInFlight,
}

/// First failing precondition of a submission, worded for the end user.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("your account details are still loading, try again in a moment")]
    UserUnavailable,
    #[error("verify your account before publishing gigs")]
    Unverified,
    #[error("complete your profile before publishing gigs")]
    ProfileIncomplete,
    #[error("the free plan allows up to {limit} gigs, upgrade to publish more")]
    GigLimitReached { limit: usize },
    #[error("your trust score {actual} is below the required {required}")]
    TrustTooLow { required: u8, actual: u8 },
    #[error("your free grace period has ended, upgrade to publish gigs")]
    GracePeriodEnded,
    #[error("{} requires a Pro plan, you are on {}", .mode.label(), .tier.label())]
    UpgradeRequired {
        mode: PublicationMode,
        tier: SubscriptionTier,
    },
    #[error("select a publication date before scheduling")]
    DateRequired,
    #[error("this publication flow has already been submitted or closed")]
    Closed,
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Validates a chosen publication mode and forwards it to the sink.
pub struct SubmissionDispatcher<S> {
    sink: Arc<S>,
    policy: EligibilityPolicy,
    in_flight: AtomicBool,
    closed: AtomicBool,
}

impl<S> SubmissionDispatcher<S>
where
    S: PublicationSink,
{
    pub fn new(sink: Arc<S>, policy: EligibilityPolicy) -> Self {
        Self {
            sink,
            policy,
            in_flight: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Checks run in a fixed order and stop at the first failure.
    pub fn check_preconditions<'c>(
        &self,
        context: &SubmissionContext<'c>,
        mode: PublicationMode,
    ) -> Result<&'c UserSnapshot, SubmissionError> {
        let snapshot = context.snapshot.ok_or(SubmissionError::UserUnavailable)?;
        let paid = snapshot.tier.is_paid();
        let score = context.score.value();

        if !snapshot.verified {
            return Err(SubmissionError::Unverified);
        }
        if !snapshot.profile_complete {
            return Err(SubmissionError::ProfileIncomplete);
        }

        let required = match mode {
            PublicationMode::Create => self.policy.min_trust_basic,
            PublicationMode::Regular => self.policy.min_trust_regular,
            PublicationMode::Automatic => self.policy.min_trust_automatic,
        };
        ensure_trust(score, required)?;

        match mode {
            PublicationMode::Create => {
                if !paid && !context.in_grace_period {
                    return Err(SubmissionError::GracePeriodEnded);
                }
            }
            PublicationMode::Regular | PublicationMode::Automatic => {
                ensure_pro(snapshot.tier, mode)?;
            }
        }

        if !paid && context.existing_gig_count >= self.policy.free_tier_gig_limit {
            return Err(SubmissionError::GigLimitReached {
                limit: self.policy.free_tier_gig_limit,
            });
        }

        if mode == PublicationMode::Automatic && context.selected_date.is_none() {
            return Err(SubmissionError::DateRequired);
        }

        Ok(snapshot)
    }

    pub fn submit(
        &self,
        context: &SubmissionContext<'_>,
        mode: PublicationMode,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, SubmissionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return Ok(DispatchOutcome::AlreadyInFlight);
        };
        if self.is_closed() {
            return Err(SubmissionError::Closed);
        }

        let snapshot = match self.check_preconditions(context, mode) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                info!(?mode, reason = %err, "publication rejected");
                return Err(err);
            }
        };

        let request = PublicationRequest {
            user_id: snapshot.user_id.clone(),
            mode,
            publish_at: context.selected_date.unwrap_or(now),
        };

        match self.sink.publish(request.clone()) {
            Ok(()) => {
                // Closed before the guard drops so a queued submit sees it.
                self.close();
                info!(
                    user_id = %request.user_id.0,
                    ?mode,
                    publish_at = %request.publish_at,
                    "publication dispatched"
                );
                Ok(DispatchOutcome::Dispatched { request })
            }
            Err(err) => {
                warn!(user_id = %request.user_id.0, ?mode, error = %err, "publication sink failed");
                Err(SubmissionError::Sink(err))
            }
        }
    }
}

fn ensure_trust(actual: u8, required: u8) -> Result<(), SubmissionError> {
    if actual < required {
        return Err(SubmissionError::TrustTooLow { required, actual });
    }
    Ok(())
}

fn ensure_pro(tier: SubscriptionTier, mode: PublicationMode) -> Result<(), SubmissionError> {
    if !tier.includes_pro_features() {
        return Err(SubmissionError::UpgradeRequired { mode, tier });
    }
    Ok(())
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
