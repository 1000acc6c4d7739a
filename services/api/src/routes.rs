use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{NaiveDate, Utc};
use gig_publish::workflows::publication::{
    assess_trust, publication_router, PublicationContextProvider, PublicationService,
    PublicationSink, TrustAssessment, UserSnapshot,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct TrustScoreRequest {
    pub(crate) snapshot: UserSnapshot,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrustScoreResponse {
    pub(crate) user_id: String,
    pub(crate) today: NaiveDate,
    #[serde(flatten)]
    pub(crate) assessment: TrustAssessment,
}

pub(crate) fn with_publication_routes<P, S>(service: Arc<PublicationService<P, S>>) -> axum::Router
where
    P: PublicationContextProvider + 'static,
    S: PublicationSink + 'static,
{
    publication_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/publication/trust-score",
            axum::routing::post(trust_score_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Scores an arbitrary snapshot without touching any stored account.
pub(crate) async fn trust_score_endpoint(
    Json(payload): Json<TrustScoreRequest>,
) -> Json<TrustScoreResponse> {
    let TrustScoreRequest { snapshot, today } = payload;
    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    let assessment = assess_trust(Some(&snapshot), today);

    Json(TrustScoreResponse {
        user_id: snapshot.user_id.0,
        today,
        assessment,
    })
}
