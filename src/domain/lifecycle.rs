//! Report and action-plan status transitions.
//!
//! A report moves Open -> In Progress when a plan is attached and
//! In Progress -> Resolved only together with its plan reaching Completed.
//! Every transition is expressed as a single change value so persistence can
//! apply the plan row and the report row as one unit.

use time::OffsetDateTime;

use crate::domain::entities::{ActionPlanRecord, IncidentReportRecord};
use crate::domain::error::DomainError;
use crate::domain::types::{Coded, PlanStatus, ReportStatus};

/// Both row updates produced by a plan status change.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStatusChange {
    pub action_plan_id: i32,
    pub incident_report_id: i32,
    pub status: PlanStatus,
    pub remarks: Option<String>,
    /// Set only when the plan is being completed.
    pub completed_at: Option<OffsetDateTime>,
    /// New status for the parent report, if it changes.
    pub report_status: Option<ReportStatus>,
}

/// Validate a status change requested for `plan` under `report`.
pub fn plan_status_change(
    report: &IncidentReportRecord,
    plan: &ActionPlanRecord,
    next: PlanStatus,
    remarks: Option<String>,
    now: OffsetDateTime,
) -> Result<PlanStatusChange, DomainError> {
    if report.action_plan_id != Some(plan.id) || plan.incident_report_id != report.id {
        return Err(DomainError::validation(format!(
            "action plan {} is not attached to incident report {}",
            plan.id, report.id
        )));
    }

    if let Some(current) = plan.status().filter(|status| status.is_closed()) {
        return Err(DomainError::validation(format!(
            "action plan {} is already {}",
            plan.id,
            current.label().to_lowercase()
        )));
    }

    let completing = next == PlanStatus::Completed;

    Ok(PlanStatusChange {
        action_plan_id: plan.id,
        incident_report_id: report.id,
        status: next,
        remarks,
        completed_at: completing.then_some(now),
        report_status: completing.then_some(ReportStatus::Resolved),
    })
}

/// A report accepts a plan only while it has none.
pub fn ensure_plan_attachable(report: &IncidentReportRecord) -> Result<(), DomainError> {
    if let Some(existing) = report.action_plan_id {
        return Err(DomainError::validation(format!(
            "incident report {} already has action plan {existing}",
            report.id
        )));
    }
    if report.status() == Some(ReportStatus::Resolved) {
        return Err(DomainError::invariant(format!(
            "incident report {} is resolved without an action plan",
            report.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn report(plan: Option<i32>) -> IncidentReportRecord {
        IncidentReportRecord {
            id: 7,
            title: "Spill".into(),
            description: "Oil on floor".into(),
            location: "Bay 2".into(),
            status: if plan.is_some() {
                ReportStatus::InProgress.code()
            } else {
                ReportStatus::Open.code()
            },
            accident_id: 1,
            department_id: 1,
            reported_by: 1,
            reported_date: datetime!(2024-03-01 08:00 UTC),
            action_plan_id: plan,
        }
    }

    fn plan(status: PlanStatus) -> ActionPlanRecord {
        ActionPlanRecord {
            id: 3,
            incident_report_id: 7,
            action_detail: "Clean up".into(),
            status: status.code(),
            priority: 20,
            action_type: 10,
            due_date: datetime!(2024-03-05 00:00 UTC),
            completed_date: None,
            maintenance_staff_id: 1,
            remarks: None,
        }
    }

    #[test]
    fn completing_resolves_report_and_stamps_time() {
        let now = datetime!(2024-03-04 12:00 UTC);
        let change = plan_status_change(
            &report(Some(3)),
            &plan(PlanStatus::InProgress),
            PlanStatus::Completed,
            Some("done".into()),
            now,
        )
        .expect("valid change");

        assert_eq!(change.completed_at, Some(now));
        assert_eq!(change.report_status, Some(ReportStatus::Resolved));
        assert_eq!(change.remarks.as_deref(), Some("done"));
    }

    #[test]
    fn pending_leaves_report_untouched() {
        let change = plan_status_change(
            &report(Some(3)),
            &plan(PlanStatus::InProgress),
            PlanStatus::Pending,
            None,
            datetime!(2024-03-04 12:00 UTC),
        )
        .expect("valid change");

        assert_eq!(change.completed_at, None);
        assert_eq!(change.report_status, None);
    }

    #[test]
    fn closed_plan_rejects_changes() {
        for closed in [PlanStatus::Completed, PlanStatus::Cancelled] {
            let err = plan_status_change(
                &report(Some(3)),
                &plan(closed),
                PlanStatus::InProgress,
                None,
                datetime!(2024-03-04 12:00 UTC),
            )
            .expect_err("closed plan");
            assert!(matches!(err, DomainError::Validation { .. }));
        }
    }

    #[test]
    fn plan_must_belong_to_report() {
        let err = plan_status_change(
            &report(Some(99)),
            &plan(PlanStatus::InProgress),
            PlanStatus::Completed,
            None,
            datetime!(2024-03-04 12:00 UTC),
        )
        .expect_err("foreign plan");
        assert!(err.to_string().contains("not attached"));
    }

    #[test]
    fn attach_requires_report_without_plan() {
        assert!(ensure_plan_attachable(&report(None)).is_ok());
        assert!(ensure_plan_attachable(&report(Some(3))).is_err());
    }
}
