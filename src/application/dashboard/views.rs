//! Serializable aggregate results.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListItem {
    pub id: i32,
    #[serde(rename = "type")]
    pub accident_type: String,
    pub description: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub reported_date: OffsetDateTime,
    pub reported_by: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarPoint {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReporterCount {
    pub name: String,
    pub count: usize,
}

/// Completed and pending shares of attached plans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DonutChart {
    pub completed: f64,
    pub pending: f64,
}

/// Plans per maintenance team as two index-aligned arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamBarChart {
    #[serde(rename = "xLabel")]
    pub counts: Vec<usize>,
    #[serde(rename = "yLabel")]
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: Date,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    pub completed_over_time: Vec<DailyCount>,
    pub pending_over_time: Vec<DailyCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub x: OffsetDateTime,
    pub y: usize,
}

/// Accident type name -> hourly series, ascending by hour.
pub type AccidentTrend = BTreeMap<String, Vec<TrendPoint>>;

/// One row of the open action-plan listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenActionPlan {
    #[serde(rename = "actionID")]
    pub action_id: i32,
    #[serde(rename = "incidentReportID")]
    pub incident_report_id: i32,
    pub action_detail: String,
    pub incident_report_title: String,
    pub location: String,
    pub priority: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    pub action_type: &'static str,
    pub maintenance_team: String,
    pub accident_type: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlanKpi {
    pub average_due_days: f64,
    pub percentage_on_time: f64,
    pub no_of_active_plans: usize,
}
