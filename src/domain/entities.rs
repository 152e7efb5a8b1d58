//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::{Coded, PlanStatus, ReportStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentReportRecord {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub status: i32,
    pub accident_id: i32,
    pub department_id: i32,
    pub reported_by: i32,
    pub reported_date: OffsetDateTime,
    pub action_plan_id: Option<i32>,
}

impl IncidentReportRecord {
    pub fn status(&self) -> Option<ReportStatus> {
        ReportStatus::from_code(self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPlanRecord {
    pub id: i32,
    pub incident_report_id: i32,
    pub action_detail: String,
    pub status: i32,
    pub priority: i32,
    pub action_type: i32,
    pub due_date: OffsetDateTime,
    pub completed_date: Option<OffsetDateTime>,
    pub maintenance_staff_id: i32,
    pub remarks: Option<String>,
}

impl ActionPlanRecord {
    pub fn status(&self) -> Option<PlanStatus> {
        PlanStatus::from_code(self.status)
    }

    pub fn is_completed(&self) -> bool {
        self.status == PlanStatus::Completed.code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccidentRecord {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentRecord {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub department_id: i32,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceTeamRecord {
    pub id: i32,
    pub name: String,
}
