//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::entities::{
    AccidentRecord, ActionPlanRecord, DepartmentRecord, IncidentReportRecord,
    MaintenanceTeamRecord, UserRecord,
};
use crate::domain::lifecycle::PlanStatusChange;
use crate::domain::types::{ActionType, Priority};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("conflicting update: {message}")]
    Conflict { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateReportParams {
    pub title: String,
    pub description: String,
    pub location: String,
    pub accident_id: i32,
    pub department_id: i32,
    pub reported_by: i32,
    pub reported_date: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct AttachPlanParams {
    pub incident_report_id: i32,
    pub action_detail: String,
    pub priority: Priority,
    pub action_type: ActionType,
    pub due_date: OffsetDateTime,
    pub maintenance_staff_id: i32,
}

/// Read access to the live incident tables.
///
/// Aggregates are computed from full listings; adapters return rows in
/// primary-key order.
#[async_trait]
pub trait IncidentReadRepo: Send + Sync {
    async fn list_reports(&self) -> Result<Vec<IncidentReportRecord>, RepoError>;

    async fn list_action_plans(&self) -> Result<Vec<ActionPlanRecord>, RepoError>;

    async fn list_accidents(&self) -> Result<Vec<AccidentRecord>, RepoError>;

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, RepoError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError>;

    async fn list_maintenance_teams(&self) -> Result<Vec<MaintenanceTeamRecord>, RepoError>;

    async fn find_report(&self, id: i32) -> Result<Option<IncidentReportRecord>, RepoError>;

    async fn find_action_plan(&self, id: i32) -> Result<Option<ActionPlanRecord>, RepoError>;

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, RepoError>;
}

/// Write access. Every method is a single all-or-nothing unit.
#[async_trait]
pub trait IncidentWriteRepo: Send + Sync {
    async fn create_report(
        &self,
        params: CreateReportParams,
    ) -> Result<IncidentReportRecord, RepoError>;

    /// Insert an in-progress plan and link it to its report, moving the
    /// report to in progress.
    async fn attach_action_plan(
        &self,
        params: AttachPlanParams,
    ) -> Result<ActionPlanRecord, RepoError>;

    /// Apply the plan update and, when present, the report status update.
    async fn apply_plan_status_change(
        &self,
        change: PlanStatusChange,
    ) -> Result<ActionPlanRecord, RepoError>;
}
