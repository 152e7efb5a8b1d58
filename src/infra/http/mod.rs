mod action_plans;
mod aggregates;
mod middleware;
mod reports;
mod response;

pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use response::{ApiEnvelope, DataList};

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::application::action_plans::{ActionPlanError, ActionPlanService};
use crate::application::dashboard::{AggregateError, DashboardService};
use crate::application::error::HttpError;
use crate::application::reports::{ReportError, ReportService};
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

use self::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct ApiState {
    pub dashboard: DashboardService,
    pub action_plans: ActionPlanService,
    pub reports: ReportService,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/reports/get", get(reports::reports_overview))
        .route(
            "/api/reports/summaryreports-2",
            get(reports::accident_hourly_trend),
        )
        .route("/api/reports/post", post(reports::submit_report))
        .route("/api/actionplan/get", get(action_plans::list_open))
        .route("/api/actionplan/post", post(action_plans::attach))
        .route("/api/actionplan/put", put(action_plans::update_status))
        .route("/api/actionplan/get/kpi", get(action_plans::kpi))
        .route("/api/actionplan/get/chart", get(action_plans::charts))
        .route("/api/aggregates/{key}", get(aggregates::single))
        .route("/health/live", get(liveness))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn liveness() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Map a repository error to a consistent HTTP error response.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::Duplicate { constraint } => {
            HttpError::new(source, StatusCode::CONFLICT, "Duplicate record", constraint)
        }
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::InvalidInput { message } => {
            HttpError::new(source, StatusCode::BAD_REQUEST, "Invalid input", message)
        }
        RepoError::Integrity { message } => HttpError::new(
            source,
            StatusCode::CONFLICT,
            "Integrity constraint violated",
            message,
        ),
        RepoError::Conflict { message } => HttpError::new(
            source,
            StatusCode::CONFLICT,
            "Record was changed by another request",
            message,
        ),
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            "Database timeout",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            message,
        ),
    }
}

pub fn domain_error_to_http(source: &'static str, err: DomainError) -> HttpError {
    let (status, message) = match &err {
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "Resource not found"),
        DomainError::Validation { .. } => {
            (StatusCode::BAD_REQUEST, "Request could not be processed")
        }
        DomainError::Invariant { .. } => (StatusCode::CONFLICT, "Lifecycle invariant violated"),
    };
    HttpError::from_error(source, status, message, &err)
}

impl From<AggregateError> for HttpError {
    fn from(error: AggregateError) -> Self {
        const SOURCE: &str = "infra::http::aggregate_error_to_http";
        match error {
            AggregateError::Repo {
                source: RepoError::Timeout,
                ..
            } => HttpError::from_error(
                SOURCE,
                StatusCode::SERVICE_UNAVAILABLE,
                "Database timeout",
                &error,
            ),
            other => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                &other,
            ),
        }
    }
}

impl From<ActionPlanError> for HttpError {
    fn from(error: ActionPlanError) -> Self {
        const SOURCE: &str = "infra::http::action_plan_error_to_http";
        match error {
            ActionPlanError::Domain(err) => domain_error_to_http(SOURCE, err),
            ActionPlanError::Repo(err) => repo_error_to_http(SOURCE, err),
        }
    }
}

impl From<ReportError> for HttpError {
    fn from(error: ReportError) -> Self {
        const SOURCE: &str = "infra::http::report_error_to_http";
        match error {
            ReportError::Domain(err) => domain_error_to_http(SOURCE, err),
            ReportError::Repo(err) => repo_error_to_http(SOURCE, err),
        }
    }
}
