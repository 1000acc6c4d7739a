//! Three-step publication wizard.
//!
//! Navigation is driven only by explicit user actions. The date required for
//! scheduled publication is checked by the dispatcher, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::PublicationMode;

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Eligibility,
    Selection,
    Confirmation,
}

impl WizardStep {
    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Eligibility => "Eligibility",
            WizardStep::Selection => "Choose publication",
            WizardStep::Confirmation => "Confirm",
        }
    }

    fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Eligibility => Some(WizardStep::Selection),
            WizardStep::Selection => Some(WizardStep::Confirmation),
            WizardStep::Confirmation => None,
        }
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Eligibility => None,
            WizardStep::Selection => Some(WizardStep::Eligibility),
            WizardStep::Confirmation => Some(WizardStep::Selection),
        }
    }
}

/// User actions that drive the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    Continue,
    Back,
    /// Direct jump from the step indicator.
    JumpTo { step: WizardStep },
    SelectOption { mode: PublicationMode },
    SelectDate { date: DateTime<Utc> },
    ClearDate,
}

/// Rejected wizard actions. The state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("choose a publication option before continuing")]
    OptionRequired,
    #[error("the confirmation step has no further step")]
    NoNextStep,
    #[error("publication options can only be chosen from the selection step onward")]
    SelectionNotOpen,
    #[error("the scheduled date {requested} is in the past")]
    DateInPast { requested: DateTime<Utc> },
}

/// Mutable wizard state for a single open flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationWizard {
    current_step: WizardStep,
    active_option: Option<PublicationMode>,
    selected_date: Option<DateTime<Utc>>,
}

impl Default for PublicationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicationWizard {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Eligibility,
            active_option: None,
            selected_date: None,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn active_option(&self) -> Option<PublicationMode> {
        self.active_option
    }

    pub fn selected_date(&self) -> Option<DateTime<Utc>> {
        self.selected_date
    }

    pub fn apply(&mut self, action: WizardAction, now: DateTime<Utc>) -> Result<(), WizardError> {
        match action {
            WizardAction::Continue => {
                let next = self.current_step.next().ok_or(WizardError::NoNextStep)?;
                self.enter(next)
            }
            WizardAction::Back => {
                if let Some(previous) = self.current_step.previous() {
                    self.current_step = previous;
                }
                Ok(())
            }
            WizardAction::JumpTo { step } => self.enter(step),
            WizardAction::SelectOption { mode } => {
                if self.current_step == WizardStep::Eligibility {
                    return Err(WizardError::SelectionNotOpen);
                }
                self.active_option = Some(mode);
                Ok(())
            }
            WizardAction::SelectDate { date } => {
                if date < now {
                    return Err(WizardError::DateInPast { requested: date });
                }
                self.selected_date = Some(date);
                Ok(())
            }
            WizardAction::ClearDate => {
                self.selected_date = None;
                Ok(())
            }
        }
    }

    fn enter(&mut self, step: WizardStep) -> Result<(), WizardError> {
        if step == WizardStep::Confirmation && self.active_option.is_none() {
            return Err(WizardError::OptionRequired);
        }
        self.current_step = step;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn continue_from_eligibility_opens_selection() {
        let mut wizard = PublicationWizard::new();
        wizard
            .apply(WizardAction::Continue, now())
            .expect("continue allowed");
        assert_eq!(wizard.current_step(), WizardStep::Selection);
    }

    #[test]
    fn continue_without_option_stays_on_selection() {
        let mut wizard = PublicationWizard::new();
        wizard.apply(WizardAction::Continue, now()).expect("continue");

        let err = wizard
            .apply(WizardAction::Continue, now())
            .expect_err("guard rejects");
        assert_eq!(err, WizardError::OptionRequired);
        assert_eq!(wizard.current_step(), WizardStep::Selection);
    }

    #[test]
    fn back_at_first_step_is_a_no_op() {
        let mut wizard = PublicationWizard::new();
        wizard.apply(WizardAction::Back, now()).expect("back allowed");
        assert_eq!(wizard.current_step(), WizardStep::Eligibility);
    }

    #[test]
    fn past_dates_are_rejected() {
        let mut wizard = PublicationWizard::new();
        let requested = now() - Duration::minutes(1);

        let err = wizard
            .apply(WizardAction::SelectDate { date: requested }, now())
            .expect_err("past date rejected");
        assert_eq!(err, WizardError::DateInPast { requested });
        assert!(wizard.selected_date().is_none());
    }

    #[test]
    fn option_cannot_be_chosen_before_selection_step() {
        let mut wizard = PublicationWizard::new();
        let err = wizard
            .apply(
                WizardAction::SelectOption {
                    mode: PublicationMode::Create,
                },
                now(),
            )
            .expect_err("selection not open");
        assert_eq!(err, WizardError::SelectionNotOpen);
    }
}
