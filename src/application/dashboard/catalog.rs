//! Named aggregates and how each one is computed.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::repos::{IncidentReadRepo, RepoError};
use crate::cache::CacheKey;

use super::queries;
use super::views::{
    AccidentTrend, BarPoint, DonutChart, LineChart, PieSlice, ReportListItem, ReporterCount,
    StatusCounts, TeamBarChart,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKey {
    IncidentReportList,
    IncidentStatusCounts,
    AccidentTypeBarChart,
    DepartmentPieChart,
    TopReporters,
    TopReportersThisMonth,
    ActionPlanDonut,
    MaintenanceTeamBarChart,
    ActionPlanLineChart,
    AccidentHourlyTrend,
}

impl AggregateKey {
    pub const ALL: [AggregateKey; 10] = [
        AggregateKey::IncidentReportList,
        AggregateKey::IncidentStatusCounts,
        AggregateKey::AccidentTypeBarChart,
        AggregateKey::DepartmentPieChart,
        AggregateKey::TopReporters,
        AggregateKey::TopReportersThisMonth,
        AggregateKey::ActionPlanDonut,
        AggregateKey::MaintenanceTeamBarChart,
        AggregateKey::ActionPlanLineChart,
        AggregateKey::AccidentHourlyTrend,
    ];

    /// Everything the reports dashboard renders in one round trip.
    pub const REPORTS_OVERVIEW: [AggregateKey; 6] = [
        AggregateKey::IncidentReportList,
        AggregateKey::IncidentStatusCounts,
        AggregateKey::AccidentTypeBarChart,
        AggregateKey::DepartmentPieChart,
        AggregateKey::TopReporters,
        AggregateKey::TopReportersThisMonth,
    ];

    pub const ACTION_PLAN_CHARTS: [AggregateKey; 3] = [
        AggregateKey::ActionPlanDonut,
        AggregateKey::MaintenanceTeamBarChart,
        AggregateKey::ActionPlanLineChart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AggregateKey::IncidentReportList => "incident-report-list",
            AggregateKey::IncidentStatusCounts => "incident-status-counts",
            AggregateKey::AccidentTypeBarChart => "accident-type-bar-chart",
            AggregateKey::DepartmentPieChart => "department-pie-chart",
            AggregateKey::TopReporters => "top-reporters",
            AggregateKey::TopReportersThisMonth => "top-reporters-this-month",
            AggregateKey::ActionPlanDonut => "action-plan-donut",
            AggregateKey::MaintenanceTeamBarChart => "action-plan-team-bar-chart",
            AggregateKey::ActionPlanLineChart => "action-plan-line-chart",
            AggregateKey::AccidentHourlyTrend => "accident-hourly-trend",
        }
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown aggregate `{0}`")]
pub struct UnknownAggregate(pub String);

impl FromStr for AggregateKey {
    type Err = UnknownAggregate;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AggregateKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| UnknownAggregate(value.to_string()))
    }
}

impl Serialize for AggregateKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl CacheKey for AggregateKey {
    fn metric_label(&self) -> &'static str {
        self.as_str()
    }
}

/// A computed aggregate. Cloning shares the underlying result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregateValue {
    ReportList(Arc<Vec<ReportListItem>>),
    StatusCounts(Arc<StatusCounts>),
    BarChart(Arc<Vec<BarPoint>>),
    PieChart(Arc<Vec<PieSlice>>),
    Reporters(Arc<Vec<ReporterCount>>),
    Donut(Arc<DonutChart>),
    TeamBarChart(Arc<TeamBarChart>),
    LineChart(Arc<LineChart>),
    AccidentTrend(Arc<AccidentTrend>),
}

impl AggregateValue {
    pub fn as_report_list(&self) -> Option<&[ReportListItem]> {
        match self {
            AggregateValue::ReportList(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_status_counts(&self) -> Option<&StatusCounts> {
        match self {
            AggregateValue::StatusCounts(counts) => Some(counts),
            _ => None,
        }
    }

    pub fn as_bar_chart(&self) -> Option<&[BarPoint]> {
        match self {
            AggregateValue::BarChart(points) => Some(points.as_slice()),
            _ => None,
        }
    }

    pub fn as_pie_chart(&self) -> Option<&[PieSlice]> {
        match self {
            AggregateValue::PieChart(slices) => Some(slices.as_slice()),
            _ => None,
        }
    }

    pub fn as_reporters(&self) -> Option<&[ReporterCount]> {
        match self {
            AggregateValue::Reporters(rows) => Some(rows.as_slice()),
            _ => None,
        }
    }

    pub fn as_donut(&self) -> Option<&DonutChart> {
        match self {
            AggregateValue::Donut(donut) => Some(donut),
            _ => None,
        }
    }

    pub fn as_team_bar_chart(&self) -> Option<&TeamBarChart> {
        match self {
            AggregateValue::TeamBarChart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn as_line_chart(&self) -> Option<&LineChart> {
        match self {
            AggregateValue::LineChart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn as_accident_trend(&self) -> Option<&AccidentTrend> {
        match self {
            AggregateValue::AccidentTrend(trend) => Some(trend),
            _ => None,
        }
    }
}

/// Run the computation behind `key` against the current table contents.
///
/// `now` is only consulted by time-windowed aggregates.
pub async fn compute(
    key: AggregateKey,
    reads: &dyn IncidentReadRepo,
    now: OffsetDateTime,
) -> Result<AggregateValue, RepoError> {
    let value = match key {
        AggregateKey::IncidentReportList => {
            let (reports, accidents, users) = tokio::try_join!(
                reads.list_reports(),
                reads.list_accidents(),
                reads.list_users()
            )?;
            AggregateValue::ReportList(Arc::new(queries::report_list(
                &reports, &accidents, &users,
            )))
        }
        AggregateKey::IncidentStatusCounts => {
            let reports = reads.list_reports().await?;
            AggregateValue::StatusCounts(Arc::new(queries::status_counts(&reports)))
        }
        AggregateKey::AccidentTypeBarChart => {
            let (reports, accidents) =
                tokio::try_join!(reads.list_reports(), reads.list_accidents())?;
            AggregateValue::BarChart(Arc::new(queries::accident_bar_chart(&reports, &accidents)))
        }
        AggregateKey::DepartmentPieChart => {
            let (reports, departments) =
                tokio::try_join!(reads.list_reports(), reads.list_departments())?;
            AggregateValue::PieChart(Arc::new(queries::department_pie_chart(
                &reports,
                &departments,
            )))
        }
        AggregateKey::TopReporters | AggregateKey::TopReportersThisMonth => {
            let (reports, users, departments) = tokio::try_join!(
                reads.list_reports(),
                reads.list_users(),
                reads.list_departments()
            )?;
            let window = (key == AggregateKey::TopReportersThisMonth)
                .then(|| queries::MonthWindow::containing(now));
            AggregateValue::Reporters(Arc::new(queries::top_reporters(
                &reports,
                &users,
                &departments,
                window,
            )))
        }
        AggregateKey::ActionPlanDonut => {
            let (reports, plans) =
                tokio::try_join!(reads.list_reports(), reads.list_action_plans())?;
            AggregateValue::Donut(Arc::new(queries::action_plan_donut(&reports, &plans)))
        }
        AggregateKey::MaintenanceTeamBarChart => {
            let (plans, teams) =
                tokio::try_join!(reads.list_action_plans(), reads.list_maintenance_teams())?;
            AggregateValue::TeamBarChart(Arc::new(queries::team_bar_chart(&plans, &teams)))
        }
        AggregateKey::ActionPlanLineChart => {
            let plans = reads.list_action_plans().await?;
            AggregateValue::LineChart(Arc::new(queries::line_chart(&plans)))
        }
        AggregateKey::AccidentHourlyTrend => {
            let (reports, accidents) =
                tokio::try_join!(reads.list_reports(), reads.list_accidents())?;
            AggregateValue::AccidentTrend(Arc::new(queries::accident_hourly_trend(
                &reports, &accidents,
            )))
        }
    };

    Ok(value)
}
