use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAnalysisStore, InMemoryReportRepository};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pix_triage::config::AppConfig;
use pix_triage::error::AppError;
use pix_triage::reports::ReportService;
use pix_triage::scoring::ScoringEngine;
use pix_triage::telemetry;
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

    let repository = Arc::new(InMemoryReportRepository::default());
    let store = Arc::new(InMemoryAnalysisStore::default());
    let engine = ScoringEngine::from_config(&config.llm, store.clone());
    let report_service = Arc::new(ReportService::new(repository, store, engine));

    let app = with_report_routes(report_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fraud report triage service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
