//! Action-plan listing, KPIs and lifecycle writes.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::clock::Clock;
use crate::application::dashboard::queries::open_action_plans;
use crate::application::dashboard::views::{ActionPlanKpi, OpenActionPlan};
use crate::application::kpi::action_plan_kpi;
use crate::application::repos::{AttachPlanParams, IncidentReadRepo, IncidentWriteRepo, RepoError};
use crate::domain::entities::ActionPlanRecord;
use crate::domain::error::DomainError;
use crate::domain::lifecycle::{ensure_plan_attachable, plan_status_change};
use crate::domain::types::{ActionType, Coded, PlanStatus, Priority};

#[derive(Debug, Error)]
pub enum ActionPlanError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Raw plan submission; codes are validated before anything is written.
#[derive(Debug, Clone)]
pub struct NewActionPlan {
    pub incident_report_id: i32,
    pub action_detail: String,
    pub maintenance_staff_id: i32,
    pub due_date: OffsetDateTime,
    pub action_type: i32,
    pub priority: i32,
}

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub action_plan_id: i32,
    pub incident_report_id: i32,
    pub status: i32,
    pub remarks: Option<String>,
}

#[derive(Clone)]
pub struct ActionPlanService {
    reads: Arc<dyn IncidentReadRepo>,
    writes: Arc<dyn IncidentWriteRepo>,
    clock: Arc<dyn Clock>,
}

impl ActionPlanService {
    pub fn new(
        reads: Arc<dyn IncidentReadRepo>,
        writes: Arc<dyn IncidentWriteRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reads,
            writes,
            clock,
        }
    }

    pub async fn list_open(&self) -> Result<Vec<OpenActionPlan>, ActionPlanError> {
        let (reports, plans, accidents, teams) = tokio::try_join!(
            self.reads.list_reports(),
            self.reads.list_action_plans(),
            self.reads.list_accidents(),
            self.reads.list_maintenance_teams()
        )?;
        Ok(open_action_plans(&reports, &plans, &accidents, &teams))
    }

    pub async fn kpi(&self) -> Result<ActionPlanKpi, ActionPlanError> {
        let (reports, plans) =
            tokio::try_join!(self.reads.list_reports(), self.reads.list_action_plans())?;
        Ok(action_plan_kpi(&reports, &plans, self.clock.now()))
    }

    pub async fn attach(&self, plan: NewActionPlan) -> Result<ActionPlanRecord, ActionPlanError> {
        let priority = Priority::from_code(plan.priority).ok_or_else(|| {
            DomainError::validation(format!("unknown priority code {}", plan.priority))
        })?;
        let action_type = ActionType::from_code(plan.action_type).ok_or_else(|| {
            DomainError::validation(format!("unknown action type code {}", plan.action_type))
        })?;
        if plan.action_detail.trim().is_empty() {
            return Err(DomainError::validation("action detail must not be empty").into());
        }

        let report = self
            .reads
            .find_report(plan.incident_report_id)
            .await?
            .ok_or(DomainError::not_found("incident report", plan.incident_report_id))?;
        ensure_plan_attachable(&report)?;

        let record = self
            .writes
            .attach_action_plan(AttachPlanParams {
                incident_report_id: report.id,
                action_detail: plan.action_detail,
                priority,
                action_type,
                due_date: plan.due_date,
                maintenance_staff_id: plan.maintenance_staff_id,
            })
            .await?;

        info!(
            action_plan_id = record.id,
            incident_report_id = report.id,
            "Action plan attached"
        );
        Ok(record)
    }

    pub async fn update_status(
        &self,
        update: StatusUpdate,
    ) -> Result<ActionPlanRecord, ActionPlanError> {
        let next = PlanStatus::from_code(update.status).ok_or_else(|| {
            DomainError::validation(format!("unknown action plan status code {}", update.status))
        })?;

        let (plan, report) = tokio::try_join!(
            self.reads.find_action_plan(update.action_plan_id),
            self.reads.find_report(update.incident_report_id)
        )?;
        let plan = plan.ok_or(DomainError::not_found("action plan", update.action_plan_id))?;
        let report =
            report.ok_or(DomainError::not_found("incident report", update.incident_report_id))?;

        let change = plan_status_change(&report, &plan, next, update.remarks, self.clock.now())?;
        let record = self.writes.apply_plan_status_change(change).await?;

        info!(
            action_plan_id = record.id,
            incident_report_id = report.id,
            status = next.label(),
            "Action plan status updated"
        );
        Ok(record)
    }
}
