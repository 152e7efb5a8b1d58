use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::application::dashboard::{AggregateBundle, AggregateKey, AggregateValue};
use crate::application::error::HttpError;
use crate::application::reports::NewReport;

use super::{ApiEnvelope, ApiState, DataList};

const SOURCE: &str = "infra::http::reports";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IncidentReportsSection<'a> {
    data: Option<&'a AggregateValue>,
    report_counts: Option<&'a AggregateValue>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportsOverview<'a> {
    incident_reports: IncidentReportsSection<'a>,
    bar_chart: Option<&'a AggregateValue>,
    pie_chart: Option<&'a AggregateValue>,
    incident_reports_by_users: Option<&'a AggregateValue>,
    #[serde(rename = "topUsersbyReports")]
    top_users_by_reports: Option<&'a AggregateValue>,
}

impl<'a> ReportsOverview<'a> {
    fn from_bundle(bundle: &'a AggregateBundle) -> Self {
        Self {
            incident_reports: IncidentReportsSection {
                data: bundle.get(AggregateKey::IncidentReportList),
                report_counts: bundle.get(AggregateKey::IncidentStatusCounts),
            },
            bar_chart: bundle.get(AggregateKey::AccidentTypeBarChart),
            pie_chart: bundle.get(AggregateKey::DepartmentPieChart),
            incident_reports_by_users: bundle.get(AggregateKey::TopReporters),
            top_users_by_reports: bundle.get(AggregateKey::TopReportersThisMonth),
        }
    }
}

pub(super) async fn reports_overview(State(state): State<ApiState>) -> Result<Response, HttpError> {
    let bundle = state.dashboard.reports_overview().await?;
    let overview = ReportsOverview::from_bundle(&bundle);
    Ok(Json(ApiEnvelope::ok("Success", overview)).into_response())
}

pub(super) async fn accident_hourly_trend(
    State(state): State<ApiState>,
) -> Result<Response, HttpError> {
    let trend = state
        .dashboard
        .aggregate(AggregateKey::AccidentHourlyTrend)
        .await?;
    Ok(Json(ApiEnvelope::ok("Success", DataList { data: trend })).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewReportRequest {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    #[serde(rename = "accidentID")]
    accident_id: i32,
    #[serde(rename = "reportedBy")]
    reported_by: i32,
}

pub(super) async fn submit_report(
    State(state): State<ApiState>,
    payload: Result<Json<NewReportRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(request) = payload.map_err(|rejection| {
        HttpError::from_error(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Model State is Invalid",
            &rejection,
        )
    })?;

    let record = state
        .reports
        .submit(NewReport {
            title: request.title,
            description: request.description,
            location: request.location,
            accident_id: request.accident_id,
            reported_by: request.reported_by,
        })
        .await?;

    Ok(Json(ApiEnvelope::ok("New Reports Added Successfully", record)).into_response())
}
