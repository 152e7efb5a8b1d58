use async_trait::async_trait;

use crate::{
    application::repos::{IncidentReadRepo, RepoError},
    domain::entities::{
        AccidentRecord, ActionPlanRecord, DepartmentRecord, IncidentReportRecord,
        MaintenanceTeamRecord, UserRecord,
    },
};

use super::rows::{
    ActionPlanRow, IncidentReportRow, NamedRow, PLAN_COLUMNS, REPORT_COLUMNS, UserRow,
};
use super::{PostgresRepositories, map_sqlx_error};

impl PostgresRepositories {
    async fn list_named<T: From<NamedRow> + Send>(&self, table: &'static str) -> Result<Vec<T>, RepoError> {
        let sql = format!("SELECT id, name FROM {table} ORDER BY id");
        let rows = sqlx::query_as::<_, NamedRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(T::from).collect())
    }
}

#[async_trait]
impl IncidentReadRepo for PostgresRepositories {
    async fn list_reports(&self) -> Result<Vec<IncidentReportRecord>, RepoError> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM incident_reports ORDER BY id");
        let rows = sqlx::query_as::<_, IncidentReportRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(IncidentReportRecord::from).collect())
    }

    async fn list_action_plans(&self) -> Result<Vec<ActionPlanRecord>, RepoError> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM action_plans ORDER BY id");
        let rows = sqlx::query_as::<_, ActionPlanRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ActionPlanRecord::from).collect())
    }

    async fn list_accidents(&self) -> Result<Vec<AccidentRecord>, RepoError> {
        self.list_named("accidents").await
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, RepoError> {
        self.list_named("departments").await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, department_id FROM users ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn list_maintenance_teams(&self) -> Result<Vec<MaintenanceTeamRecord>, RepoError> {
        self.list_named("maintenance_teams").await
    }

    async fn find_report(&self, id: i32) -> Result<Option<IncidentReportRecord>, RepoError> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM incident_reports WHERE id = $1");
        let row = sqlx::query_as::<_, IncidentReportRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(IncidentReportRecord::from))
    }

    async fn find_action_plan(&self, id: i32) -> Result<Option<ActionPlanRecord>, RepoError> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM action_plans WHERE id = $1");
        let row = sqlx::query_as::<_, ActionPlanRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ActionPlanRecord::from))
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, department_id FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }
}
