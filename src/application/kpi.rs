//! Action-plan KPIs. Computed on every request, never cached.

use time::{OffsetDateTime, UtcOffset};

use crate::application::dashboard::queries::attached_plans;
use crate::application::dashboard::views::ActionPlanKpi;
use crate::application::ratio::{mean, percent, round_half_even};
use crate::domain::entities::{ActionPlanRecord, IncidentReportRecord};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Start of the UTC day containing `now`.
pub fn utc_midnight(now: OffsetDateTime) -> OffsetDateTime {
    now.to_offset(UtcOffset::UTC).date().midnight().assume_utc()
}

/// KPIs over plans attached to a report.
///
/// A plan is overdue when its due date falls before today's UTC midnight
/// and it is not completed; overdue age is measured in fractional days from
/// the due date to that midnight.
pub fn action_plan_kpi(
    reports: &[IncidentReportRecord],
    plans: &[ActionPlanRecord],
    now: OffsetDateTime,
) -> ActionPlanKpi {
    let attached = attached_plans(reports, plans);
    let today = utc_midnight(now);

    let overdue_days: Vec<f64> = attached
        .iter()
        .filter(|plan| plan.due_date < today && !plan.is_completed())
        .map(|plan| (today - plan.due_date).as_seconds_f64() / SECONDS_PER_DAY)
        .collect();

    let completed: Vec<_> = attached.iter().filter(|plan| plan.is_completed()).collect();
    let on_time = completed
        .iter()
        .filter(|plan| {
            plan.completed_date
                .is_some_and(|completed_at| completed_at <= plan.due_date)
        })
        .count();

    ActionPlanKpi {
        average_due_days: round_half_even(mean(&overdue_days), 2),
        percentage_on_time: round_half_even(percent(on_time, completed.len()), 2),
        no_of_active_plans: attached.len() - completed.len(),
    }
}
