use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_session_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use grazing_gss::config::AppConfig;
use grazing_gss::error::AppError;
use grazing_gss::workflows::recommendation::TemplateRecommender;
use grazing_gss::workflows::scoring::SuitabilityScorer;
use grazing_gss::workflows::session::{AnalysisService, InMemorySessionStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemorySessionStore::with_capacity(
        config.sessions.max_sessions,
    ));
    let scorer = SuitabilityScorer::new(config.scoring.clone())?;
    let analysis_service = Arc::new(AnalysisService::new(
        store,
        Arc::new(TemplateRecommender),
        scorer,
    ));

    let app = with_session_routes(analysis_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_sessions = config.sessions.max_sessions,
        "grazing suitability service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
