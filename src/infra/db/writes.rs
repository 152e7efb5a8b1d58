use async_trait::async_trait;

use crate::{
    application::repos::{AttachPlanParams, CreateReportParams, IncidentWriteRepo, RepoError},
    domain::entities::{ActionPlanRecord, IncidentReportRecord},
    domain::lifecycle::PlanStatusChange,
    domain::types::{Coded, PlanStatus, ReportStatus},
};

use super::rows::{ActionPlanRow, IncidentReportRow, PLAN_COLUMNS, REPORT_COLUMNS};
use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl IncidentWriteRepo for PostgresRepositories {
    async fn create_report(
        &self,
        params: CreateReportParams,
    ) -> Result<IncidentReportRecord, RepoError> {
        let sql = format!(
            "INSERT INTO incident_reports \
                (title, description, location, status, accident_id, department_id, reported_by, reported_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {REPORT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, IncidentReportRow>(&sql)
            .bind(params.title)
            .bind(params.description)
            .bind(params.location)
            .bind(ReportStatus::Open.code())
            .bind(params.accident_id)
            .bind(params.department_id)
            .bind(params.reported_by)
            .bind(params.reported_date)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn attach_action_plan(
        &self,
        params: AttachPlanParams,
    ) -> Result<ActionPlanRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let sql = format!(
            "INSERT INTO action_plans \
                (incident_report_id, action_detail, status, priority, action_type, due_date, maintenance_staff_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PLAN_COLUMNS}"
        );
        let plan = sqlx::query_as::<_, ActionPlanRow>(&sql)
            .bind(params.incident_report_id)
            .bind(params.action_detail)
            .bind(PlanStatus::InProgress.code())
            .bind(params.priority.code())
            .bind(params.action_type.code())
            .bind(params.due_date)
            .bind(params.maintenance_staff_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let plan = ActionPlanRecord::from(plan);

        let linked = sqlx::query(
            "UPDATE incident_reports SET status = $1, action_plan_id = $2 \
             WHERE id = $3 AND action_plan_id IS NULL",
        )
        .bind(ReportStatus::InProgress.code())
        .bind(plan.id)
        .bind(params.incident_report_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if linked.rows_affected() == 0 {
            return Err(RepoError::conflict(format!(
                "incident report {} already has an action plan",
                params.incident_report_id
            )));
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(plan)
    }

    async fn apply_plan_status_change(
        &self,
        change: PlanStatusChange,
    ) -> Result<ActionPlanRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let sql = format!(
            "UPDATE action_plans \
             SET status = $1, remarks = $2, completed_date = COALESCE($3, completed_date) \
             WHERE id = $4 AND incident_report_id = $5 AND status NOT IN ($6, $7) \
             RETURNING {PLAN_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ActionPlanRow>(&sql)
            .bind(change.status.code())
            .bind(change.remarks)
            .bind(change.completed_at)
            .bind(change.action_plan_id)
            .bind(change.incident_report_id)
            .bind(PlanStatus::Completed.code())
            .bind(PlanStatus::Cancelled.code())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        // A row that exists but missed the guard was closed by a concurrent writer.
        let Some(plan) = updated else {
            let exists: Option<i32> = sqlx::query_scalar(
                "SELECT id FROM action_plans WHERE id = $1 AND incident_report_id = $2",
            )
            .bind(change.action_plan_id)
            .bind(change.incident_report_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            return Err(match exists {
                Some(_) => RepoError::conflict(format!(
                    "action plan {} is already closed",
                    change.action_plan_id
                )),
                None => RepoError::NotFound,
            });
        };

        if let Some(status) = change.report_status {
            let updated = sqlx::query("UPDATE incident_reports SET status = $1 WHERE id = $2")
                .bind(status.code())
                .bind(change.incident_report_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

            if updated.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(plan.into())
    }
}
