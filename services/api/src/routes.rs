use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use pix_triage::reports::{report_router, AnalysisStore, ReportRepository, ReportService};

pub(crate) fn with_report_routes<R, S>(service: Arc<ReportService<R, S>>) -> axum::Router
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    report_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryAnalysisStore, InMemoryReportRepository};
    use axum::body::Body;
    use axum::http::Request;
    use pix_triage::scoring::{PlaceholderPolicy, PromptLibrary, ScoringEngine};
    use std::path::PathBuf;
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn composed_router_exposes_health_and_report_listing() {
        let store = Arc::new(InMemoryAnalysisStore::default());
        let prompts = PromptLibrary::new(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../prompts"),
            PlaceholderPolicy::Lenient,
        );
        let engine = ScoringEngine::new(prompts, None, store.clone());
        let service = Arc::new(ReportService::new(
            Arc::new(InMemoryReportRepository::default()),
            store,
            engine,
        ));
        let app = with_report_routes(service);

        let health = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request handled");
        assert_eq!(health.status(), StatusCode::OK);

        let listing = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reports")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request handled");
        assert_eq!(listing.status(), StatusCode::OK);
    }
}
