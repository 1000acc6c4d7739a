use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::dispatcher::{DispatchOutcome, SubmissionError};
use super::domain::{PublicationMode, SessionId, UserId};
use super::flow::{FlowError, FlowView};
use super::provider::{ProviderError, PublicationContextProvider, PublicationSink};
use super::service::{PublicationService, PublicationServiceError};
use super::wizard::WizardAction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSessionRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub mode: Option<PublicationMode>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    session_id: String,
    view: FlowView,
}

/// Router builder exposing the eligibility lookup and the publication wizard.
pub fn publication_router<P, S>(service: Arc<PublicationService<P, S>>) -> Router
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/publication/users/:user_id/eligibility",
            get(eligibility_handler::<P, S>),
        )
        .route(
            "/api/v1/publication/sessions",
            post(open_session_handler::<P, S>),
        )
        .route(
            "/api/v1/publication/sessions/:session_id",
            get(view_handler::<P, S>).delete(close_handler::<P, S>),
        )
        .route(
            "/api/v1/publication/sessions/:session_id/actions",
            post(action_handler::<P, S>),
        )
        .route(
            "/api/v1/publication/sessions/:session_id/submit",
            post(submit_handler::<P, S>),
        )
        .with_state(service)
}

pub(crate) async fn eligibility_handler<P, S>(
    State(service): State<Arc<PublicationService<P, S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    match service.eligibility(&UserId(user_id), Utc::now()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn open_session_handler<P, S>(
    State(service): State<Arc<PublicationService<P, S>>>,
    axum::Json(request): axum::Json<OpenSessionRequest>,
) -> Response
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    match service.open_session(UserId(request.user_id), Utc::now()) {
        Ok((session_id, view)) => {
            let body = SessionResponse {
                session_id: session_id.0,
                view,
            };
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<P, S>(
    State(service): State<Arc<PublicationService<P, S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    let session_id = SessionId(session_id);
    match service.view(&session_id, Utc::now()) {
        Ok(view) => session_response(StatusCode::OK, session_id, view),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn action_handler<P, S>(
    State(service): State<Arc<PublicationService<P, S>>>,
    Path(session_id): Path<String>,
    axum::Json(action): axum::Json<WizardAction>,
) -> Response
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    let session_id = SessionId(session_id);
    match service.apply(&session_id, action, Utc::now()) {
        Ok(view) => session_response(StatusCode::OK, session_id, view),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<P, S>(
    State(service): State<Arc<PublicationService<P, S>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    match service.submit(&SessionId(session_id), request.mode, Utc::now()) {
        Ok(outcome @ DispatchOutcome::Dispatched { .. }) => {
            (StatusCode::ACCEPTED, axum::Json(outcome)).into_response()
        }
        Ok(outcome @ DispatchOutcome::AlreadyInFlight) => {
            (StatusCode::CONFLICT, axum::Json(outcome)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn close_handler<P, S>(
    State(service): State<Arc<PublicationService<P, S>>>,
    Path(session_id): Path<String>,
) -> StatusCode
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    service.close_session(&SessionId(session_id));
    StatusCode::NO_CONTENT
}

fn session_response(status: StatusCode, session_id: SessionId, view: FlowView) -> Response {
    let body = SessionResponse {
        session_id: session_id.0,
        view,
    };
    (status, axum::Json(body)).into_response()
}

fn error_response(error: PublicationServiceError) -> Response {
    let status = match &error {
        PublicationServiceError::SessionNotFound(_)
        | PublicationServiceError::Provider(ProviderError::UnknownUser(_)) => StatusCode::NOT_FOUND,
        PublicationServiceError::SnapshotPending(_) => StatusCode::ACCEPTED,
        PublicationServiceError::Provider(ProviderError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        PublicationServiceError::Flow(FlowError::Closed) => StatusCode::GONE,
        PublicationServiceError::Flow(FlowError::Submission(SubmissionError::Sink(_))) => {
            StatusCode::BAD_GATEWAY
        }
        PublicationServiceError::Flow(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
