use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::dispatcher::DispatchOutcome;
use super::domain::{PublicationMode, SessionId, UserId};
use super::eligibility::EligibilityPolicy;
use super::flow::{EligibilityReport, FlowError, FlowInputs, FlowView, PublicationFlow};
use super::provider::{ProviderError, PublicationContextProvider, PublicationSink};
use super::wizard::WizardAction;

/// Service composing the data provider, publication sink, and per-session flows.
pub struct PublicationService<P, S> {
    provider: Arc<P>,
    sink: Arc<S>,
    policy: EligibilityPolicy,
    sessions: Mutex<HashMap<SessionId, Arc<PublicationFlow<S>>>>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("flow-{id:06}"))
}

impl<P, S> PublicationService<P, S>
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    pub fn new(provider: Arc<P>, sink: Arc<S>, policy: EligibilityPolicy) -> Self {
        Self {
            provider,
            sink,
            policy,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// One-shot eligibility lookup without opening a flow.
    pub fn eligibility(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<EligibilityReport, PublicationServiceError> {
        let inputs = self.load_inputs(user_id)?;
        let snapshot = inputs
            .snapshot
            .as_ref()
            .ok_or_else(|| PublicationServiceError::SnapshotPending(user_id.0.clone()))?;

        Ok(EligibilityReport::build(
            &self.policy,
            snapshot,
            inputs.existing_gig_count,
            inputs.in_grace_period,
            now,
        ))
    }

    /// Open a new flow. Every open starts from the eligibility step.
    pub fn open_session(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(SessionId, FlowView), PublicationServiceError> {
        let inputs = self.load_inputs(&user_id)?;
        let flow = Arc::new(PublicationFlow::open(
            user_id.clone(),
            self.sink.clone(),
            self.policy,
        ));
        let view = flow.view(&inputs, now);

        let session_id = next_session_id();
        self.lock_sessions().insert(session_id.clone(), flow);
        info!(session_id = %session_id.0, user_id = %user_id.0, "publication flow opened");

        Ok((session_id, view))
    }

    pub fn view(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<FlowView, PublicationServiceError> {
        let flow = self.flow(session_id)?;
        let inputs = self.load_inputs(flow.user_id())?;
        Ok(flow.view(&inputs, now))
    }

    pub fn apply(
        &self,
        session_id: &SessionId,
        action: WizardAction,
        now: DateTime<Utc>,
    ) -> Result<FlowView, PublicationServiceError> {
        let flow = self.flow(session_id)?;
        debug!(session_id = %session_id.0, ?action, "applying wizard action");
        flow.apply(action, now)?;

        let inputs = self.load_inputs(flow.user_id())?;
        Ok(flow.view(&inputs, now))
    }

    pub fn submit(
        &self,
        session_id: &SessionId,
        mode: Option<PublicationMode>,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, PublicationServiceError> {
        let flow = self.flow(session_id)?;
        let inputs = self.load_inputs(flow.user_id())?;
        let outcome = flow.submit(&inputs, mode, now)?;
        if let DispatchOutcome::Dispatched { request } = &outcome {
            self.lock_sessions().remove(session_id);
            info!(
                session_id = %session_id.0,
                user_id = %request.user_id.0,
                "publication flow finished"
            );
        }
        Ok(outcome)
    }

    /// Drop a flow. Closing an unknown session is not an error.
    pub fn close_session(&self, session_id: &SessionId) {
        if let Some(flow) = self.lock_sessions().remove(session_id) {
            flow.close();
            info!(session_id = %session_id.0, "publication flow closed");
        }
    }

    /// Number of tracked sessions. Dispatched and closed flows are dropped from the store.
    pub fn open_sessions(&self) -> usize {
        self.lock_sessions().len()
    }

    fn flow(&self, session_id: &SessionId) -> Result<Arc<PublicationFlow<S>>, PublicationServiceError> {
        self.lock_sessions()
            .get(session_id)
            .cloned()
            .ok_or_else(|| PublicationServiceError::SessionNotFound(session_id.0.clone()))
    }

    fn load_inputs(&self, user_id: &UserId) -> Result<FlowInputs, PublicationServiceError> {
        let snapshot = self.provider.user_snapshot(user_id)?;
        let existing_gig_count = self.provider.existing_gigs(user_id)?.len();
        let in_grace_period = self.provider.in_grace_period(user_id)?;

        Ok(FlowInputs {
            snapshot,
            existing_gig_count,
            in_grace_period,
        })
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, Arc<PublicationFlow<S>>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Error raised by the publication service.
#[derive(Debug, thiserror::Error)]
pub enum PublicationServiceError {
    #[error("publication session {0} not found")]
    SessionNotFound(String),
    #[error("account data for {0} is still loading")]
    SnapshotPending(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Flow(#[from] FlowError),
}
