use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::dispatcher::{DispatchOutcome, SubmissionContext, SubmissionDispatcher, SubmissionError};
use super::domain::{PublicationMode, UserId, UserSnapshot};
use super::eligibility::{Eligibility, EligibilityPolicy};
use super::provider::PublicationSink;
use super::scoring::{assess_trust, TrustAssessment};
use super::wizard::{PublicationWizard, WizardAction, WizardError, WizardStep};

/// Data the host loads for a flow before rendering or submitting.
#[derive(Debug, Clone, Default)]
pub struct FlowInputs {
    /// `None` while the data store query is still pending.
    pub snapshot: Option<UserSnapshot>,
    pub existing_gig_count: usize,
    pub in_grace_period: bool,
}

/// Trust score and capability flags for one user at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityReport {
    pub user_id: UserId,
    pub existing_gig_count: usize,
    pub in_grace_period: bool,
    pub trust: TrustAssessment,
    pub eligibility: Eligibility,
    pub available_modes: Vec<PublicationMode>,
    pub notices: Vec<&'static str>,
}

impl EligibilityReport {
    pub fn build(
        policy: &EligibilityPolicy,
        snapshot: &UserSnapshot,
        existing_gig_count: usize,
        in_grace_period: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let trust = assess_trust(Some(snapshot), now.date_naive());
        let eligibility = policy.evaluate(snapshot, trust.score, in_grace_period, existing_gig_count);

        Self {
            user_id: snapshot.user_id.clone(),
            existing_gig_count,
            in_grace_period,
            trust,
            available_modes: eligibility.available_modes(),
            notices: eligibility.overlays.notices(),
            eligibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardView {
    pub current_step: WizardStep,
    pub step_label: &'static str,
    pub active_option: Option<PublicationMode>,
    pub selected_date: Option<DateTime<Utc>>,
}

impl From<&PublicationWizard> for WizardView {
    fn from(wizard: &PublicationWizard) -> Self {
        Self {
            current_step: wizard.current_step(),
            step_label: wizard.current_step().label(),
            active_option: wizard.active_option(),
            selected_date: wizard.selected_date(),
        }
    }
}

/// Render model for an open flow.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowView {
    /// Snapshot not available yet; eligibility is deferred.
    Loading { wizard: WizardView },
    Ready {
        report: EligibilityReport,
        wizard: WizardView,
    },
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("the publication flow is closed")]
    Closed,
    #[error("choose a publication option before submitting")]
    NoOptionSelected,
    #[error("review your choice on the confirmation step before submitting")]
    NotConfirmed { step: WizardStep },
    #[error("{} was submitted but {} is selected", .requested.label(), .selected.label())]
    ModeMismatch {
        requested: PublicationMode,
        selected: PublicationMode,
    },
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// One user's publication wizard together with its submission guard.
pub struct PublicationFlow<S> {
    user_id: UserId,
    policy: EligibilityPolicy,
    wizard: Mutex<PublicationWizard>,
    dispatcher: SubmissionDispatcher<S>,
}

impl<S> PublicationFlow<S>
where
    S: PublicationSink,
{
    /// Opens a flow with a fresh wizard.
    pub fn open(user_id: UserId, sink: Arc<S>, policy: EligibilityPolicy) -> Self {
        Self {
            user_id,
            policy,
            wizard: Mutex::new(PublicationWizard::new()),
            dispatcher: SubmissionDispatcher::new(sink, policy),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn is_open(&self) -> bool {
        !self.dispatcher.is_closed()
    }

    pub fn close(&self) {
        self.dispatcher.close();
    }

    pub fn wizard(&self) -> WizardView {
        WizardView::from(&*self.lock_wizard())
    }

    pub fn view(&self, inputs: &FlowInputs, now: DateTime<Utc>) -> FlowView {
        if !self.is_open() {
            return FlowView::Closed;
        }

        let wizard = self.wizard();
        match &inputs.snapshot {
            None => FlowView::Loading { wizard },
            Some(snapshot) => FlowView::Ready {
                report: EligibilityReport::build(
                    &self.policy,
                    snapshot,
                    inputs.existing_gig_count,
                    inputs.in_grace_period,
                    now,
                ),
                wizard,
            },
        }
    }

    pub fn apply(&self, action: WizardAction, now: DateTime<Utc>) -> Result<WizardView, FlowError> {
        if !self.is_open() {
            return Err(FlowError::Closed);
        }

        let mut wizard = self.lock_wizard();
        wizard.apply(action, now)?;
        Ok(WizardView::from(&*wizard))
    }

    /// Submits the option chosen in the wizard. Only allowed from the confirmation step;
    /// an explicit `mode` must match that option. A successful dispatch closes the flow.
    pub fn submit(
        &self,
        inputs: &FlowInputs,
        mode: Option<PublicationMode>,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, FlowError> {
        if !self.is_open() {
            return Err(FlowError::Closed);
        }

        let (step, active_option, selected_date) = {
            let wizard = self.lock_wizard();
            (
                wizard.current_step(),
                wizard.active_option(),
                wizard.selected_date(),
            )
        };
        if step != WizardStep::Confirmation {
            return Err(FlowError::NotConfirmed { step });
        }
        let selected = active_option.ok_or(FlowError::NoOptionSelected)?;
        if let Some(requested) = mode {
            if requested != selected {
                return Err(FlowError::ModeMismatch {
                    requested,
                    selected,
                });
            }
        }

        let trust = assess_trust(inputs.snapshot.as_ref(), now.date_naive());
        let context = SubmissionContext {
            snapshot: inputs.snapshot.as_ref(),
            score: trust.score,
            in_grace_period: inputs.in_grace_period,
            existing_gig_count: inputs.existing_gig_count,
            selected_date,
        };

        match self.dispatcher.submit(&context, selected, now) {
            Err(SubmissionError::Closed) => Err(FlowError::Closed),
            other => Ok(other?),
        }
    }

    fn lock_wizard(&self) -> MutexGuard<'_, PublicationWizard> {
        self.wizard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
