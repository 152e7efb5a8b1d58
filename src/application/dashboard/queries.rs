//! Pure aggregate computations over raw table rows.
//!
//! Rows referencing a missing accident, department, user or team get an empty
//! label instead of failing the aggregate. The team chart groups orphans
//! under [`UNASSIGNED_TEAM`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

use crate::application::ratio::{format_percent_label, percent, round_half_even};
use crate::domain::entities::{
    AccidentRecord, ActionPlanRecord, DepartmentRecord, IncidentReportRecord,
    MaintenanceTeamRecord, UserRecord,
};
use crate::domain::types::{ActionType, Coded, PlanStatus, Priority, ReportStatus, label_for};

use super::views::{
    AccidentTrend, BarPoint, DailyCount, DonutChart, LineChart, OpenActionPlan, PieSlice,
    ReportListItem, ReporterCount, StatusCounts, TeamBarChart, TrendPoint,
};

pub const UNASSIGNED_TEAM: &str = "Unassigned";

/// Calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: Month,
}

impl MonthWindow {
    pub fn containing(instant: OffsetDateTime) -> Self {
        let utc = instant.to_offset(UtcOffset::UTC);
        Self {
            year: utc.year(),
            month: utc.month(),
        }
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        let utc = instant.to_offset(UtcOffset::UTC);
        utc.year() == self.year && utc.month() == self.month
    }
}

fn names_by_id<'a, T>(
    rows: &'a [T],
    id: impl Fn(&T) -> i32,
    name: impl Fn(&'a T) -> &'a str,
) -> HashMap<i32, &'a str> {
    rows.iter().map(|row| (id(row), name(row))).collect()
}

fn accident_names(accidents: &[AccidentRecord]) -> HashMap<i32, &str> {
    names_by_id(accidents, |a| a.id, |a| a.name.as_str())
}

fn lookup<'a>(names: &HashMap<i32, &'a str>, id: i32) -> &'a str {
    names.get(&id).copied().unwrap_or("")
}

fn utc_date(instant: OffsetDateTime) -> Date {
    instant.to_offset(UtcOffset::UTC).date()
}

fn truncate_to_hour(instant: OffsetDateTime) -> OffsetDateTime {
    let utc = instant.to_offset(UtcOffset::UTC);
    utc - Duration::new(
        i64::from(utc.minute()) * 60 + i64::from(utc.second()),
        utc.nanosecond() as i32,
    )
}

pub fn status_counts(reports: &[IncidentReportRecord]) -> StatusCounts {
    reports
        .iter()
        .fold(StatusCounts::default(), |mut counts, report| {
            match report.status() {
                Some(ReportStatus::Open) => counts.open += 1,
                Some(ReportStatus::InProgress) => counts.in_progress += 1,
                Some(ReportStatus::Resolved) => counts.resolved += 1,
                None => {}
            }
            counts
        })
}

pub fn report_list(
    reports: &[IncidentReportRecord],
    accidents: &[AccidentRecord],
    users: &[UserRecord],
) -> Vec<ReportListItem> {
    let accidents = accident_names(accidents);
    let users: HashMap<i32, &UserRecord> = users.iter().map(|user| (user.id, user)).collect();

    reports
        .iter()
        .map(|report| ReportListItem {
            id: report.id,
            accident_type: lookup(&accidents, report.accident_id).to_string(),
            description: report.description.clone(),
            location: report.location.clone(),
            reported_date: report.reported_date,
            reported_by: users
                .get(&report.reported_by)
                .map(|user| user.full_name())
                .unwrap_or_default(),
            status: label_for::<ReportStatus>(report.status),
        })
        .collect()
}

/// Reports per accident type, label descending.
pub fn accident_bar_chart(
    reports: &[IncidentReportRecord],
    accidents: &[AccidentRecord],
) -> Vec<BarPoint> {
    let names = accident_names(accidents);
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for report in reports {
        *counts.entry(lookup(&names, report.accident_id)).or_default() += 1;
    }

    counts
        .into_iter()
        .rev()
        .map(|(label, count)| BarPoint {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Reports per department, ordered by department id. Shares are taken
/// against every report.
pub fn department_pie_chart(
    reports: &[IncidentReportRecord],
    departments: &[DepartmentRecord],
) -> Vec<PieSlice> {
    let names = names_by_id(departments, |d| d.id, |d| d.name.as_str());
    let total = reports.len();
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for report in reports {
        *counts.entry(report.department_id).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(department_id, count)| PieSlice {
            label: lookup(&names, department_id).to_string(),
            value: count,
            percentage: format_percent_label(percent(count, total)),
        })
        .collect()
}

fn reporter_label(user: &UserRecord, departments: &HashMap<i32, &str>) -> String {
    match departments.get(&user.department_id) {
        Some(department) => format!("{}, {}", user.full_name(), department),
        None => user.full_name(),
    }
}

/// Reports per reporting user, count descending then label ascending.
pub fn top_reporters(
    reports: &[IncidentReportRecord],
    users: &[UserRecord],
    departments: &[DepartmentRecord],
    window: Option<MonthWindow>,
) -> Vec<ReporterCount> {
    let departments = names_by_id(departments, |d| d.id, |d| d.name.as_str());
    let users: HashMap<i32, &UserRecord> = users.iter().map(|user| (user.id, user)).collect();

    let mut counts: HashMap<i32, usize> = HashMap::new();
    for report in reports
        .iter()
        .filter(|report| window.is_none_or(|w| w.contains(report.reported_date)))
    {
        *counts.entry(report.reported_by).or_default() += 1;
    }

    let mut rows: Vec<ReporterCount> = counts
        .into_iter()
        .map(|(user_id, count)| ReporterCount {
            name: users
                .get(&user_id)
                .map(|user| reporter_label(user, &departments))
                .unwrap_or_default(),
            count,
        })
        .collect();

    rows.sort_by(|a, b| match b.count.cmp(&a.count) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
    rows
}

/// Plans referenced by a report, one per referencing report.
pub fn attached_plans<'a>(
    reports: &[IncidentReportRecord],
    plans: &'a [ActionPlanRecord],
) -> Vec<&'a ActionPlanRecord> {
    let plans: HashMap<i32, &ActionPlanRecord> = plans.iter().map(|plan| (plan.id, plan)).collect();
    reports
        .iter()
        .filter_map(|report| report.action_plan_id)
        .filter_map(|plan_id| plans.get(&plan_id).copied())
        .collect()
}

pub fn action_plan_donut(
    reports: &[IncidentReportRecord],
    plans: &[ActionPlanRecord],
) -> DonutChart {
    let attached = attached_plans(reports, plans);
    let total = attached.len();
    let completed = attached.iter().filter(|plan| plan.is_completed()).count();

    DonutChart {
        completed: round_half_even(percent(completed, total), 2),
        pending: round_half_even(percent(total - completed, total), 2),
    }
}

/// Plans per maintenance team name, ascending.
pub fn team_bar_chart(
    plans: &[ActionPlanRecord],
    teams: &[MaintenanceTeamRecord],
) -> TeamBarChart {
    let names = names_by_id(teams, |t| t.id, |t| t.name.as_str());
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for plan in plans {
        let team = names
            .get(&plan.maintenance_staff_id)
            .copied()
            .unwrap_or(UNASSIGNED_TEAM);
        *counts.entry(team).or_default() += 1;
    }

    let mut chart = TeamBarChart::default();
    for (team, count) in counts {
        chart.counts.push(count);
        chart.teams.push(team.to_string());
    }
    chart
}

fn daily(dates: impl Iterator<Item = Date>) -> Vec<DailyCount> {
    let mut counts: BTreeMap<Date, usize> = BTreeMap::new();
    for date in dates {
        *counts.entry(date).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Completions by completion day, and open work by due day.
pub fn line_chart(plans: &[ActionPlanRecord]) -> LineChart {
    let completed = plans
        .iter()
        .filter(|plan| plan.is_completed())
        .filter_map(|plan| plan.completed_date)
        .map(utc_date);
    let pending = plans
        .iter()
        .filter(|plan| plan.completed_date.is_none() && !plan.is_completed())
        .map(|plan| utc_date(plan.due_date));

    LineChart {
        completed_over_time: daily(completed),
        pending_over_time: daily(pending),
    }
}

pub fn accident_hourly_trend(
    reports: &[IncidentReportRecord],
    accidents: &[AccidentRecord],
) -> AccidentTrend {
    let names = accident_names(accidents);
    let mut buckets: BTreeMap<(&str, OffsetDateTime), usize> = BTreeMap::new();
    for report in reports {
        let key = (
            lookup(&names, report.accident_id),
            truncate_to_hour(report.reported_date),
        );
        *buckets.entry(key).or_default() += 1;
    }

    let mut trend = AccidentTrend::new();
    for ((accident, hour), count) in buckets {
        trend
            .entry(accident.to_string())
            .or_default()
            .push(TrendPoint { x: hour, y: count });
    }
    trend
}

/// Reports whose attached plan is not completed, in report order.
pub fn open_action_plans(
    reports: &[IncidentReportRecord],
    plans: &[ActionPlanRecord],
    accidents: &[AccidentRecord],
    teams: &[MaintenanceTeamRecord],
) -> Vec<OpenActionPlan> {
    let accidents = accident_names(accidents);
    let teams = names_by_id(teams, |t| t.id, |t| t.name.as_str());
    let plans: HashMap<i32, &ActionPlanRecord> = plans.iter().map(|plan| (plan.id, plan)).collect();

    reports
        .iter()
        .filter_map(|report| {
            let plan = report.action_plan_id.and_then(|id| plans.get(&id).copied())?;
            (plan.status != PlanStatus::Completed.code()).then(|| OpenActionPlan {
                action_id: plan.id,
                incident_report_id: report.id,
                action_detail: plan.action_detail.clone(),
                incident_report_title: report.title.clone(),
                location: report.location.clone(),
                priority: label_for::<Priority>(plan.priority),
                due_date: plan.due_date,
                action_type: label_for::<ActionType>(plan.action_type),
                maintenance_team: lookup(&teams, plan.maintenance_staff_id).to_string(),
                accident_type: lookup(&accidents, report.accident_id).to_string(),
                status: label_for::<PlanStatus>(plan.status),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    fn report(id: i32, status: i32, accident: i32, department: i32, by: i32) -> IncidentReportRecord {
        IncidentReportRecord {
            id,
            title: format!("Report {id}"),
            description: "desc".into(),
            location: "Plant".into(),
            status,
            accident_id: accident,
            department_id: department,
            reported_by: by,
            reported_date: datetime!(2024-03-10 09:15 UTC),
            action_plan_id: None,
        }
    }

    fn plan(id: i32, status: PlanStatus, team: i32) -> ActionPlanRecord {
        ActionPlanRecord {
            id,
            incident_report_id: id,
            action_detail: format!("Plan {id}"),
            status: status.code(),
            priority: Priority::High.code(),
            action_type: ActionType::Corrective.code(),
            due_date: datetime!(2024-03-20 00:00 UTC),
            completed_date: None,
            maintenance_staff_id: team,
            remarks: None,
        }
    }

    fn accidents() -> Vec<AccidentRecord> {
        vec![
            AccidentRecord { id: 1, name: "Fall".into() },
            AccidentRecord { id: 2, name: "Burn".into() },
            AccidentRecord { id: 3, name: "Spill".into() },
        ]
    }

    fn user(id: i32, first: &str, last: &str, department: i32) -> UserRecord {
        UserRecord {
            id,
            first_name: first.into(),
            last_name: last.into(),
            department_id: department,
        }
    }

    #[test]
    fn status_counts_ignore_unknown_codes() {
        let reports = vec![
            report(1, 10, 1, 1, 1),
            report(2, 20, 1, 1, 1),
            report(3, 20, 1, 1, 1),
            report(4, 30, 1, 1, 1),
            report(5, 99, 1, 1, 1),
        ];
        assert_eq!(
            status_counts(&reports),
            StatusCounts {
                open: 1,
                in_progress: 2,
                resolved: 1
            }
        );
    }

    #[test]
    fn bar_chart_orders_labels_descending() {
        let reports = vec![
            report(1, 10, 1, 1, 1),
            report(2, 10, 2, 1, 1),
            report(3, 10, 3, 1, 1),
            report(4, 10, 1, 1, 1),
        ];
        let labels: Vec<_> = accident_bar_chart(&reports, &accidents())
            .into_iter()
            .map(|point| (point.label, point.count))
            .collect();
        assert_eq!(
            labels,
            vec![("Spill".into(), 1), ("Fall".into(), 2), ("Burn".into(), 1)]
        );
    }

    #[test]
    fn pie_percentages_use_one_decimal() {
        let departments = vec![
            DepartmentRecord { id: 1, name: "Ops".into() },
            DepartmentRecord { id: 2, name: "Lab".into() },
        ];
        let reports = vec![
            report(1, 10, 1, 1, 1),
            report(2, 10, 1, 1, 1),
            report(3, 10, 1, 2, 1),
        ];
        let slices = department_pie_chart(&reports, &departments);
        assert_eq!(slices[0].label, "Ops");
        assert_eq!(slices[0].percentage, "66.7%");
        assert_eq!(slices[1].percentage, "33.3%");
        assert!(department_pie_chart(&[], &departments).is_empty());
    }

    #[test]
    fn top_reporters_break_ties_by_label() {
        let users = vec![user(1, "Zed", "Ray", 1), user(2, "Amy", "Lo", 9), user(3, "Bo", "Ng", 1)];
        let departments = vec![DepartmentRecord { id: 1, name: "Ops".into() }];
        let reports = vec![
            report(1, 10, 1, 1, 1),
            report(2, 10, 1, 1, 2),
            report(3, 10, 1, 1, 3),
            report(4, 10, 1, 1, 3),
        ];

        let rows = top_reporters(&reports, &users, &departments, None);
        let names: Vec<_> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["Bo Ng, Ops", "Amy Lo", "Zed Ray, Ops"]);
    }

    #[test]
    fn monthly_reporters_follow_the_evaluation_month() {
        let users = vec![user(1, "Ann", "Lee", 1)];
        let mut february = report(2, 10, 1, 1, 1);
        february.reported_date = datetime!(2024-02-29 23:59 UTC);
        let reports = vec![report(1, 10, 1, 1, 1), february];

        let march = MonthWindow::containing(datetime!(2024-03-31 12:00 UTC));
        let rows = top_reporters(&reports, &users, &[], Some(march));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1);

        let april = MonthWindow::containing(datetime!(2024-04-01 00:00 UTC));
        assert!(top_reporters(&reports, &users, &[], Some(april)).is_empty());
    }

    #[test]
    fn donut_counts_only_attached_plans() {
        let mut reports = Vec::new();
        let mut plans = Vec::new();
        for id in 1..=10 {
            let status = if id <= 7 { PlanStatus::Completed } else { PlanStatus::Pending };
            let mut r = report(id, 20, 1, 1, 1);
            r.action_plan_id = Some(id);
            reports.push(r);
            plans.push(plan(id, status, 1));
        }
        plans.push(plan(11, PlanStatus::Pending, 1));

        let donut = action_plan_donut(&reports, &plans);
        assert_eq!(donut.completed, 70.0);
        assert_eq!(donut.pending, 30.0);
        assert_eq!(action_plan_donut(&[], &plans), DonutChart::default());
    }

    #[test]
    fn orphan_plans_group_as_unassigned() {
        let teams = vec![MaintenanceTeamRecord { id: 1, name: "Electrical".into() }];
        let plans = vec![
            plan(1, PlanStatus::InProgress, 1),
            plan(2, PlanStatus::InProgress, 7),
            plan(3, PlanStatus::Completed, 1),
        ];
        let chart = team_bar_chart(&plans, &teams);
        assert_eq!(chart.teams, vec!["Electrical".to_string(), UNASSIGNED_TEAM.to_string()]);
        assert_eq!(chart.counts, vec![2, 1]);
    }

    #[test]
    fn line_chart_splits_completed_and_pending_days() {
        let mut done = plan(1, PlanStatus::Completed, 1);
        done.completed_date = Some(datetime!(2024-03-12 18:30 UTC));
        let mut done_without_stamp = plan(2, PlanStatus::Completed, 1);
        done_without_stamp.completed_date = None;
        let mut early = plan(3, PlanStatus::Pending, 1);
        early.due_date = datetime!(2024-03-15 10:00 UTC);
        let late = plan(4, PlanStatus::InProgress, 1);

        let chart = line_chart(&[late, done, done_without_stamp, early]);
        assert_eq!(
            chart.completed_over_time,
            vec![DailyCount { date: date!(2024-03-12), count: 1 }]
        );
        assert_eq!(
            chart.pending_over_time,
            vec![
                DailyCount { date: date!(2024-03-15), count: 1 },
                DailyCount { date: date!(2024-03-20), count: 1 },
            ]
        );
    }

    #[test]
    fn hourly_trend_buckets_by_type_and_hour() {
        let mut a = report(1, 10, 1, 1, 1);
        a.reported_date = datetime!(2024-03-10 09:59:59 UTC);
        let mut b = report(2, 10, 1, 1, 1);
        b.reported_date = datetime!(2024-03-10 09:00 UTC);
        let mut c = report(3, 10, 1, 1, 1);
        c.reported_date = datetime!(2024-03-10 07:30 UTC);
        let d = report(4, 10, 2, 1, 1);

        let trend = accident_hourly_trend(&[a, b, c, d], &accidents());
        assert_eq!(
            trend["Fall"],
            vec![
                TrendPoint { x: datetime!(2024-03-10 07:00 UTC), y: 1 },
                TrendPoint { x: datetime!(2024-03-10 09:00 UTC), y: 2 },
            ]
        );
        assert_eq!(trend["Burn"].len(), 1);
    }

    #[test]
    fn open_plans_skip_completed_and_blank_missing_teams() {
        let mut open = report(1, 20, 1, 1, 1);
        open.action_plan_id = Some(1);
        let mut closed = report(2, 30, 1, 1, 1);
        closed.action_plan_id = Some(2);
        let plans = vec![plan(1, PlanStatus::Pending, 42), plan(2, PlanStatus::Completed, 1)];

        let rows = open_action_plans(&[open, closed], &plans, &accidents(), &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].maintenance_team, "");
        assert_eq!(rows[0].priority, "High");
        assert_eq!(rows[0].status, "Pending");
        assert_eq!(rows[0].accident_type, "Fall");
    }
}
