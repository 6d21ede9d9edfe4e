use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{Local, NaiveDate};
use integrity_pulse::assessments::report::export::{export_rows, to_csv, ExportFormat};
use integrity_pulse::assessments::report::{
    department_comparison, department_ranking, dimension_comparison, monthly_trend,
    organization_metrics, RankingMetric, ReportWindow,
};
use integrity_pulse::assessments::{
    assessment_router, AssessmentRepository, AssessmentService, AssessmentServiceError,
    NotificationPublisher,
};
use integrity_pulse::config::ReportingConfig;
use integrity_pulse::error::AppError;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(default)]
    pub(crate) start: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) end: Option<NaiveDate>,
}

impl ReportRequest {
    fn window(&self) -> ReportWindow {
        ReportWindow {
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankingRequest {
    #[serde(default)]
    pub(crate) start: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) end: Option<NaiveDate>,
    #[serde(default = "default_ranking_metric")]
    pub(crate) metric: RankingMetric,
    /// Falls back to the configured ranking limit when omitted.
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

fn default_ranking_metric() -> RankingMetric {
    RankingMetric::AverageScore
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendRequest {
    /// Falls back to the configured look-back when omitted.
    #[serde(default)]
    pub(crate) months: Option<u32>,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportRequest {
    #[serde(default)]
    pub(crate) start: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) end: Option<NaiveDate>,
    #[serde(default = "default_export_format")]
    pub(crate) format: ExportFormat,
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Json
}

pub(crate) fn with_assessment_routes<R, N>(
    service: Arc<AssessmentService<R, N>>,
    reporting: ReportingConfig,
) -> axum::Router
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    assessment_router(service.clone())
        .merge(report_router(service).layer(Extension(reporting)))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

fn report_router<R, N>(service: Arc<AssessmentService<R, N>>) -> axum::Router
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    axum::Router::new()
        .route(
            "/api/v1/reports/departments",
            axum::routing::post(departments_endpoint::<R, N>),
        )
        .route(
            "/api/v1/reports/dimensions",
            axum::routing::post(dimensions_endpoint::<R, N>),
        )
        .route(
            "/api/v1/reports/ranking",
            axum::routing::post(ranking_endpoint::<R, N>),
        )
        .route(
            "/api/v1/reports/trend",
            axum::routing::post(trend_endpoint::<R, N>),
        )
        .route(
            "/api/v1/reports/organization",
            axum::routing::post(organization_endpoint::<R, N>),
        )
        .route(
            "/api/v1/reports/export",
            axum::routing::post(export_endpoint::<R, N>),
        )
        .with_state(service)
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

pub(crate) async fn departments_endpoint<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Json(request): Json<ReportRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.scored_assessments() {
        Ok(rows) => Json(department_comparison(&rows, &request.window())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn dimensions_endpoint<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Json(request): Json<ReportRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.scored_assessments() {
        Ok(rows) => Json(dimension_comparison(&rows, &request.window())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn ranking_endpoint<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Extension(reporting): Extension<ReportingConfig>,
    Json(request): Json<RankingRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let window = ReportWindow {
        start: request.start,
        end: request.end,
    };
    let limit = request.limit.unwrap_or(reporting.ranking_limit);
    match service.scored_assessments() {
        Ok(rows) => {
            Json(department_ranking(&rows, &window, request.metric, limit)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn trend_endpoint<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Extension(reporting): Extension<ReportingConfig>,
    Json(request): Json<TrendRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let months = request.months.unwrap_or(reporting.trend_months);
    match service.scored_assessments() {
        Ok(rows) => Json(monthly_trend(
            &rows,
            months,
            today,
            request.department.as_deref(),
        ))
        .into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn organization_endpoint<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Json(request): Json<ReportRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let rows = match service.scored_assessments() {
        Ok(rows) => rows,
        Err(error) => return service_error_response(error),
    };

    match organization_metrics(&rows, &request.window()) {
        Some(metrics) => Json(metrics).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no scored assessments in the requested window" })),
        )
            .into_response(),
    }
}

pub(crate) async fn export_endpoint<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError>
where
    R: AssessmentRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let window = ReportWindow {
        start: request.start,
        end: request.end,
    };
    let rows = match service.scored_assessments() {
        Ok(rows) => rows,
        Err(error) => return Ok(service_error_response(error)),
    };
    let shaped = export_rows(&rows, &window);

    match request.format {
        ExportFormat::Json => Ok(Json(shaped).into_response()),
        ExportFormat::Csv => {
            let csv = to_csv(&shaped)?;
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv")],
                csv,
            )
                .into_response())
        }
    }
}

fn service_error_response(error: AssessmentServiceError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        default_scoring_config, InMemoryAssessmentRepository, InMemoryNotificationPublisher,
    };
    use integrity_pulse::assessments::{
        Answer, QuestionBank, QuestionKind, ResponseInput,
    };

    type TestService =
        AssessmentService<InMemoryAssessmentRepository, InMemoryNotificationPublisher>;

    fn build_service() -> Arc<TestService> {
        Arc::new(AssessmentService::new(
            Arc::new(InMemoryAssessmentRepository::default()),
            Arc::new(InMemoryNotificationPublisher::default()),
            default_scoring_config(),
            Arc::new(QuestionBank::standard_integrity()),
        ))
    }

    fn complete_assessment(service: &TestService, subject: &str, department: &str, choice: &str) {
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date");
        let record = service
            .start(subject.to_string(), department.to_string(), date)
            .expect("start");
        let responses: Vec<ResponseInput> = service
            .question_bank()
            .questions()
            .map(|question| ResponseInput {
                question_id: question.id,
                answer: match question.kind {
                    QuestionKind::ForcedChoice => Answer::Choice(choice.to_string()),
                    QuestionKind::LikertScale => Answer::Scale(4),
                },
                justification: None,
                time_spent_secs: Some(18),
            })
            .collect();
        for response in responses {
            service.save_response(&record.id, response).expect("answer");
        }
        service.complete(&record.id, date).expect("complete");
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn departments_endpoint_rolls_up_completed_assessments() {
        let service = build_service();
        complete_assessment(&service, "emp-1", "Finance", "a");
        complete_assessment(&service, "emp-2", "Sales", "d");

        let response =
            departments_endpoint(State(service), Json(ReportRequest::default())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let departments = body["departments"].as_array().expect("departments");
        assert_eq!(departments.len(), 2);
        assert_eq!(departments[0]["department"], "Finance");
        assert_eq!(body["total_assessments"], 2);
    }

    #[tokio::test]
    async fn organization_endpoint_is_not_found_without_data() {
        let service = build_service();

        let response =
            organization_endpoint(State(service), Json(ReportRequest::default())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn organization_endpoint_returns_health_index() {
        let service = build_service();
        complete_assessment(&service, "emp-1", "Finance", "a");

        let response =
            organization_endpoint(State(service), Json(ReportRequest::default())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["total_assessments"], 1);
        assert_eq!(body["health_index"], 100);
    }

    #[tokio::test]
    async fn export_endpoint_renders_csv() {
        let service = build_service();
        complete_assessment(&service, "emp-1", "Finance", "b");

        let response = export_endpoint(
            State(service),
            Json(ExportRequest {
                start: None,
                end: None,
                format: ExportFormat::Csv,
            }),
        )
        .await
        .expect("export succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let text = String::from_utf8(body.to_vec()).expect("utf-8 csv");
        assert!(text.starts_with("Department,Subject,Overall Score"));
        assert!(text.contains("Finance,emp-1"));
    }

    #[tokio::test]
    async fn trend_endpoint_buckets_by_month() {
        let service = build_service();
        complete_assessment(&service, "emp-1", "Finance", "a");

        let response = trend_endpoint(
            State(service),
            Extension(ReportingConfig::default()),
            Json(TrendRequest {
                months: Some(6),
                today: NaiveDate::from_ymd_opt(2026, 3, 31),
                department: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let points = body.as_array().expect("trend points");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0]["month"], "2026-03");
        assert_eq!(points[0]["total_assessments"], 1);
    }

    #[tokio::test]
    async fn ranking_endpoint_falls_back_to_the_configured_limit() {
        let service = build_service();
        complete_assessment(&service, "emp-1", "Finance", "a");
        complete_assessment(&service, "emp-2", "Sales", "b");

        let reporting = ReportingConfig {
            ranking_limit: 1,
            ..ReportingConfig::default()
        };
        let response = ranking_endpoint(
            State(service),
            Extension(reporting),
            Json(RankingRequest {
                start: None,
                end: None,
                metric: RankingMetric::AverageScore,
                limit: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let entries = body.as_array().expect("ranking entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["department"], "Finance");
    }
}
