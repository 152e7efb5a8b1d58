use time::OffsetDateTime;

use crate::domain::entities::{
    AccidentRecord, ActionPlanRecord, DepartmentRecord, IncidentReportRecord,
    MaintenanceTeamRecord, UserRecord,
};

pub(super) const REPORT_COLUMNS: &str = "id, title, description, location, status, accident_id, \
    department_id, reported_by, reported_date, action_plan_id";

pub(super) const PLAN_COLUMNS: &str = "id, incident_report_id, action_detail, status, priority, \
    action_type, due_date, completed_date, maintenance_staff_id, remarks";

#[derive(sqlx::FromRow)]
pub(super) struct IncidentReportRow {
    id: i32,
    title: String,
    description: String,
    location: String,
    status: i32,
    accident_id: i32,
    department_id: i32,
    reported_by: i32,
    reported_date: OffsetDateTime,
    action_plan_id: Option<i32>,
}

impl From<IncidentReportRow> for IncidentReportRecord {
    fn from(row: IncidentReportRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            status: row.status,
            accident_id: row.accident_id,
            department_id: row.department_id,
            reported_by: row.reported_by,
            reported_date: row.reported_date,
            action_plan_id: row.action_plan_id,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct ActionPlanRow {
    id: i32,
    incident_report_id: i32,
    action_detail: String,
    status: i32,
    priority: i32,
    action_type: i32,
    due_date: OffsetDateTime,
    completed_date: Option<OffsetDateTime>,
    maintenance_staff_id: i32,
    remarks: Option<String>,
}

impl From<ActionPlanRow> for ActionPlanRecord {
    fn from(row: ActionPlanRow) -> Self {
        Self {
            id: row.id,
            incident_report_id: row.incident_report_id,
            action_detail: row.action_detail,
            status: row.status,
            priority: row.priority,
            action_type: row.action_type,
            due_date: row.due_date,
            completed_date: row.completed_date,
            maintenance_staff_id: row.maintenance_staff_id,
            remarks: row.remarks,
        }
    }
}

/// `id, name` lookup tables share one row shape.
#[derive(sqlx::FromRow)]
pub(super) struct NamedRow {
    id: i32,
    name: String,
}

impl From<NamedRow> for AccidentRecord {
    fn from(row: NamedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<NamedRow> for DepartmentRecord {
    fn from(row: NamedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<NamedRow> for MaintenanceTeamRecord {
    fn from(row: NamedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    department_id: i32,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            department_id: row.department_id,
        }
    }
}
