use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::application::action_plans::{NewActionPlan, StatusUpdate};
use crate::application::dashboard::{AggregateKey, AggregateValue};
use crate::application::error::HttpError;

use super::{ApiEnvelope, ApiState, DataList};

const SOURCE: &str = "infra::http::action_plans";

fn invalid_request(error: &dyn std::error::Error) -> HttpError {
    HttpError::from_error(
        SOURCE,
        StatusCode::BAD_REQUEST,
        "Model State is Invalid",
        error,
    )
}

pub(super) async fn list_open(State(state): State<ApiState>) -> Result<Response, HttpError> {
    let plans = state.action_plans.list_open().await?;
    Ok(Json(ApiEnvelope::ok(
        "Successfully Retrieved Records",
        DataList { data: plans },
    ))
    .into_response())
}

pub(super) async fn kpi(State(state): State<ApiState>) -> Result<Response, HttpError> {
    let kpi = state.action_plans.kpi().await?;
    Ok(Json(ApiEnvelope::ok("Ok", kpi)).into_response())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionPlanCharts<'a> {
    donut_chart: Option<&'a AggregateValue>,
    bar_chart: Option<&'a AggregateValue>,
    line_chart: Option<&'a AggregateValue>,
}

pub(super) async fn charts(State(state): State<ApiState>) -> Result<Response, HttpError> {
    let bundle = state.dashboard.action_plan_charts().await?;
    let charts = ActionPlanCharts {
        donut_chart: bundle.get(AggregateKey::ActionPlanDonut),
        bar_chart: bundle.get(AggregateKey::MaintenanceTeamBarChart),
        line_chart: bundle.get(AggregateKey::ActionPlanLineChart),
    };
    Ok(Json(ApiEnvelope::ok("Ok", charts)).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AttachPlanForm {
    action_description: String,
    person_in_charge: i32,
    #[serde(with = "time::serde::rfc3339")]
    target_date: OffsetDateTime,
    action_types: i32,
    priority: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct AttachPlanRequest {
    #[serde(rename = "incidentReportID")]
    incident_report_id: i32,
    form: AttachPlanForm,
}

pub(super) async fn attach(
    State(state): State<ApiState>,
    payload: Result<Json<AttachPlanRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(request) = payload.map_err(|rejection| invalid_request(&rejection))?;
    let form = request.form;

    let plan = state
        .action_plans
        .attach(NewActionPlan {
            incident_report_id: request.incident_report_id,
            action_detail: form.action_description,
            maintenance_staff_id: form.person_in_charge,
            due_date: form.target_date,
            action_type: form.action_types,
            priority: form.priority,
        })
        .await?;

    Ok(Json(ApiEnvelope::ok("Action Plan Added Successfully", plan)).into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct PlanLocator {
    #[serde(rename = "actionID")]
    action_id: i32,
    #[serde(rename = "incidentReportID")]
    incident_report_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StatusUpdateRequest {
    new_action_plan_status: i32,
    #[serde(default)]
    remarks: Option<String>,
}

pub(super) async fn update_status(
    State(state): State<ApiState>,
    locator: Result<Query<PlanLocator>, QueryRejection>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Query(locator) = locator.map_err(|rejection| invalid_request(&rejection))?;
    let Json(request) = payload.map_err(|rejection| invalid_request(&rejection))?;

    let plan = state
        .action_plans
        .update_status(StatusUpdate {
            action_plan_id: locator.action_id,
            incident_report_id: locator.incident_report_id,
            status: request.new_action_plan_status,
            remarks: request.remarks,
        })
        .await?;

    Ok(Json(ApiEnvelope::ok("Ok", plan)).into_response())
}
