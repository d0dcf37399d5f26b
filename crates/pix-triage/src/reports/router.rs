use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{RecordId, ReportStatus, ReportSubmission};
use super::repository::{AnalysisStore, ReportPatch, ReportQuery, ReportRepository, RepositoryError};
use super::service::{ReportService, ReportServiceError};

/// Router builder exposing HTTP endpoints for report intake and scoring.
pub fn report_router<R, S>(service: Arc<ReportService<R, S>>) -> Router
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/reports",
            post(submit_handler::<R, S>).get(list_handler::<R, S>),
        )
        .route(
            "/api/v1/reports/:record_id",
            get(get_handler::<R, S>)
                .put(update_handler::<R, S>)
                .delete(delete_handler::<R, S>),
        )
        .route(
            "/api/v1/reports/:record_id/analysis",
            post(analyze_handler::<R, S>)
                .get(latest_analysis_handler::<R, S>)
                .delete(purge_handler::<R, S>),
        )
        .route(
            "/api/v1/reports/:record_id/assessment",
            post(assess_handler::<R, S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    page: Option<usize>,
    limit: Option<usize>,
    status: Option<ReportStatus>,
}

fn error_response(error: ReportServiceError) -> Response {
    let (status, message) = match &error {
        ReportServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "report not found".to_string())
        }
        ReportServiceError::Repository(RepositoryError::Conflict) => (
            StatusCode::CONFLICT,
            "report with this id already exists".to_string(),
        ),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    };

    (status, axum::Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn submit_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    axum::Json(submission): axum::Json<ReportSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    match service.submit(submission) {
        Ok(report) => (
            StatusCode::CREATED,
            axum::Json(json!({
                "message": "infraction report registered",
                "record_id": report.record_id,
                "report_id": report.report_id,
                "status": report.status.label(),
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    let query = ReportQuery {
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(10).max(1),
        status: params.status,
    };

    match service.list(&query) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    match service.get(&RecordId(record_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(record_id): Path<String>,
    axum::Json(patch): axum::Json<ReportPatch>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    match service.update(&RecordId(record_id), patch) {
        Ok(report) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "report updated",
                "report": report,
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    match service.delete(&RecordId(record_id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "report deleted" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analyze_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    let id = RecordId(record_id);
    match service.analyze(&id).await {
        Ok(result) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "analysis completed",
                "record_id": id,
                "status": super::assessment::status_for_score(result.score).label(),
                "result": result,
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assess_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    let id = RecordId(record_id);
    match service.quick_assess(&id) {
        Ok(outcome) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "assessment completed",
                "record_id": id,
                "score": outcome.score,
                "status": outcome.status.label(),
                "recommendations": outcome.recommendations,
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn latest_analysis_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    let id = RecordId(record_id);
    let report = match service.get(&id) {
        Ok(report) => report,
        Err(error) => return error_response(error),
    };

    match service.latest_analysis(&id) {
        Ok(Some(analysis)) => (
            StatusCode::OK,
            axum::Json(json!({
                "report": {
                    "record_id": report.record_id,
                    "status": report.status.label(),
                    "created_at": report.created_at,
                    "updated_at": report.updated_at,
                },
                "analysis": analysis,
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "no analysis recorded for this report",
                "report": {
                    "record_id": report.record_id,
                    "status": report.status.label(),
                    "created_at": report.created_at,
                },
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn purge_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: AnalysisStore + 'static,
{
    let id = RecordId(record_id);
    match service.purge_analyses(&id) {
        Ok(removed) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "analyses removed",
                "record_id": id,
                "analyses_removed": removed,
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}
