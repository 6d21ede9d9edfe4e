use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::repository::{
    AssessmentId, AssessmentRepository, NotificationPublisher, RepositoryError,
};
use super::scoring::ResponseInput;
use super::service::{AssessmentService, AssessmentServiceError};

/// Router builder exposing HTTP endpoints for the assessment lifecycle.
pub fn assessment_router<R, N>(service: Arc<AssessmentService<R, N>>) -> Router
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<R, N>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(status_handler::<R, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/responses",
            post(response_handler::<R, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/complete",
            post(complete_handler::<R, N>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/rescore",
            post(rescore_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartAssessmentRequest {
    pub(crate) subject_id: String,
    pub(crate) department: String,
    #[serde(default)]
    pub(crate) started_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteAssessmentRequest {
    #[serde(default)]
    pub(crate) completed_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RescoreRequest {
    pub(crate) responses: Vec<ResponseInput>,
}

pub(crate) async fn start_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    axum::Json(request): axum::Json<StartAssessmentRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let started_on = request
        .started_on
        .unwrap_or_else(|| Local::now().date_naive());
    match service.start(request.subject_id, request.department, started_on) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn response_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Path(assessment_id): Path<String>,
    axum::Json(response): axum::Json<ResponseInput>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.save_response(&id, response) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<CompleteAssessmentRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = AssessmentId(assessment_id);
    let completed_on = request
        .completed_on
        .unwrap_or_else(|| Local::now().date_naive());
    match service.complete(&id, completed_on) {
        Ok(report) => (StatusCode::OK, axum::Json(report.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rescore_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<RescoreRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.rescore(&id, request.responses) {
        Ok(report) => (StatusCode::OK, axum::Json(report.view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AssessmentServiceError::ResponsesFrozen(_)
        | AssessmentServiceError::AlreadyCompleted(_)
        | AssessmentServiceError::NotCompleted(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::NotScorable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
        | AssessmentServiceError::Alert(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if let AssessmentServiceError::NotScorable { excluded } = &error {
        let payload = json!({
            "error": error.to_string(),
            "excluded": excluded,
        });
        return (status, axum::Json(payload)).into_response();
    }

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
