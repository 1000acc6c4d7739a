use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryContextProvider, InMemoryPublicationSink};
use crate::routes::with_publication_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gig_publish::config::AppConfig;
use gig_publish::error::AppError;
use gig_publish::telemetry;
use gig_publish::workflows::publication::PublicationService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let provider = Arc::new(InMemoryContextProvider::seeded());
    let sink = Arc::new(InMemoryPublicationSink::default());
    let publication_service = Arc::new(PublicationService::new(
        provider,
        sink,
        config.eligibility,
    ));

    let app = with_publication_routes(publication_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        free_tier_gig_limit = config.eligibility.free_tier_gig_limit,
        "gig publication service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
