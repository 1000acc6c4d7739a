//! Gig publication eligibility, trust scoring, and the scheduling wizard.
//!
//! A seller opens a flow, reviews which publication modes their trust score and plan allow,
//! picks one (plus a date when scheduling), and confirms. Confirmation re-validates every
//! precondition before the request reaches the publication sink.

pub mod dispatcher;
pub mod domain;
pub mod eligibility;
pub mod flow;
pub mod provider;
pub mod router;
pub mod scoring;
pub mod service;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use dispatcher::{DispatchOutcome, SubmissionContext, SubmissionDispatcher, SubmissionError};
pub use domain::{
    ActivitySignals, ContentSignals, GigSummary, PenaltySignals, ProfileSignals,
    PublicationMode, PublicationRequest, QualitySignals, SessionId, SocialSignals,
    SubscriptionTier, UserId, UserSnapshot,
};
pub use eligibility::{BlockingOverlays, Eligibility, EligibilityPolicy};
pub use flow::{EligibilityReport, FlowError, FlowInputs, FlowView, PublicationFlow, WizardView};
pub use provider::{ProviderError, PublicationContextProvider, PublicationSink, SinkError};
pub use router::publication_router;
pub use scoring::{assess_trust, compute_trust_score, TrustAssessment, TrustBreakdown, TrustScore};
pub use service::{PublicationService, PublicationServiceError};
pub use wizard::{PublicationWizard, WizardAction, WizardError, WizardStep};
