#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::{Barrier, watch};

use incidentdesk::application::action_plans::ActionPlanService;
use incidentdesk::application::clock::{Clock, FixedClock};
use incidentdesk::application::dashboard::{AggregateCache, DashboardService};
use incidentdesk::application::reports::ReportService;
use incidentdesk::application::repos::{
    AttachPlanParams, CreateReportParams, IncidentReadRepo, IncidentWriteRepo, RepoError,
};
use incidentdesk::cache::CacheConfig;
use incidentdesk::domain::entities::{
    AccidentRecord, ActionPlanRecord, DepartmentRecord, IncidentReportRecord,
    MaintenanceTeamRecord, UserRecord,
};
use incidentdesk::domain::lifecycle::PlanStatusChange;
use incidentdesk::domain::types::{Coded, PlanStatus, ReportStatus};
use incidentdesk::infra::http::ApiState;

pub const NOW: OffsetDateTime = datetime!(2024-03-15 12:00 UTC);

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub reports: Vec<IncidentReportRecord>,
    pub plans: Vec<ActionPlanRecord>,
    pub accidents: Vec<AccidentRecord>,
    pub departments: Vec<DepartmentRecord>,
    pub users: Vec<UserRecord>,
    pub teams: Vec<MaintenanceTeamRecord>,
}

/// In-memory store whose writes apply to a scratch copy and only replace the
/// live tables when every step succeeds.
#[derive(Default)]
pub struct InMemoryIncidents {
    tables: Mutex<Tables>,
    /// Number of `list_reports` calls; every aggregate reads reports once.
    pub report_scans: AtomicUsize,
    pub fail_reads: AtomicBool,
    /// Fail after the plan row is written but before the report row is.
    pub fail_report_update: AtomicBool,
    failing_tables: Mutex<HashSet<Table>>,
    gates: Mutex<HashMap<Table, watch::Sender<bool>>>,
    /// `find_action_plan` and `find_report` callers wait here after reading.
    plan_lookup_barrier: Mutex<Option<Arc<Barrier>>>,
    report_lookup_barrier: Mutex<Option<Arc<Barrier>>>,
}

async fn pass_barrier(slot: &Mutex<Option<Arc<Barrier>>>) {
    let barrier = slot.lock().expect("barrier lock").clone();
    if let Some(barrier) = barrier {
        barrier.wait().await;
    }
}

/// Listing a table is the one seam a test can hold or break per aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Reports,
    Plans,
    Accidents,
    Departments,
    Users,
    Teams,
}

impl InMemoryIncidents {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> Tables {
        self.tables.lock().expect("tables lock").clone()
    }

    pub fn report_scans(&self) -> usize {
        self.report_scans.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_report_update(&self, fail: bool) {
        self.fail_report_update.store(fail, Ordering::SeqCst);
    }

    /// Make every listing of `table` fail until cleared.
    pub fn fail_table(&self, table: Table) {
        self.failing_tables.lock().expect("tables lock").insert(table);
    }

    /// Hold listings of `table` until [`open_gate`](Self::open_gate).
    pub fn close_gate(&self, table: Table) {
        let (gate, _) = watch::channel(false);
        self.gates.lock().expect("gates lock").insert(table, gate);
    }

    pub fn open_gate(&self, table: Table) {
        if let Some(gate) = self.gates.lock().expect("gates lock").get(&table) {
            gate.send_replace(true);
        }
    }

    pub fn hold_plan_lookups(&self, parties: usize) {
        *self.plan_lookup_barrier.lock().expect("barrier lock") =
            Some(Arc::new(Barrier::new(parties)));
    }

    pub fn hold_report_lookups(&self, parties: usize) {
        *self.report_lookup_barrier.lock().expect("barrier lock") =
            Some(Arc::new(Barrier::new(parties)));
    }

    pub fn push_report(&self, report: IncidentReportRecord) {
        self.tables.lock().expect("tables lock").reports.push(report);
    }

    pub fn insert_plan(&self, plan: ActionPlanRecord) {
        let mut tables = self.tables.lock().expect("tables lock");
        if let Some(report) = tables
            .reports
            .iter_mut()
            .find(|report| report.id == plan.incident_report_id)
        {
            report.action_plan_id = Some(plan.id);
        }
        tables.plans.push(plan);
    }

    fn read<T>(&self, select: impl FnOnce(&Tables) -> T) -> Result<T, RepoError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("injected read failure".to_string()));
        }
        let tables = self.tables.lock().expect("tables lock");
        Ok(select(&tables))
    }

    async fn list<T>(
        &self,
        table: Table,
        select: impl FnOnce(&Tables) -> T,
    ) -> Result<T, RepoError> {
        let gate = self
            .gates
            .lock()
            .expect("gates lock")
            .get(&table)
            .map(watch::Sender::subscribe);
        if let Some(mut gate) = gate {
            let _ = gate.wait_for(|open| *open).await;
        }
        if self.failing_tables.lock().expect("tables lock").contains(&table) {
            return Err(RepoError::Persistence(format!("injected {table:?} failure")));
        }
        self.read(select)
    }

    fn transact<T>(
        &self,
        apply: impl FnOnce(&mut Tables) -> Result<T, RepoError>,
    ) -> Result<T, RepoError> {
        let mut live = self.tables.lock().expect("tables lock");
        let mut scratch = live.clone();
        let value = apply(&mut scratch)?;
        *live = scratch;
        Ok(value)
    }
}

#[async_trait]
impl IncidentReadRepo for InMemoryIncidents {
    async fn list_reports(&self) -> Result<Vec<IncidentReportRecord>, RepoError> {
        self.report_scans.fetch_add(1, Ordering::SeqCst);
        self.list(Table::Reports, |t| t.reports.clone()).await
    }

    async fn list_action_plans(&self) -> Result<Vec<ActionPlanRecord>, RepoError> {
        self.list(Table::Plans, |t| t.plans.clone()).await
    }

    async fn list_accidents(&self) -> Result<Vec<AccidentRecord>, RepoError> {
        self.list(Table::Accidents, |t| t.accidents.clone()).await
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, RepoError> {
        self.list(Table::Departments, |t| t.departments.clone()).await
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        self.list(Table::Users, |t| t.users.clone()).await
    }

    async fn list_maintenance_teams(&self) -> Result<Vec<MaintenanceTeamRecord>, RepoError> {
        self.list(Table::Teams, |t| t.teams.clone()).await
    }

    async fn find_report(&self, id: i32) -> Result<Option<IncidentReportRecord>, RepoError> {
        let found = self.read(|t| t.reports.iter().find(|r| r.id == id).cloned());
        pass_barrier(&self.report_lookup_barrier).await;
        found
    }

    async fn find_action_plan(&self, id: i32) -> Result<Option<ActionPlanRecord>, RepoError> {
        let found = self.read(|t| t.plans.iter().find(|p| p.id == id).cloned());
        pass_barrier(&self.plan_lookup_barrier).await;
        found
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, RepoError> {
        self.read(|t| t.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl IncidentWriteRepo for InMemoryIncidents {
    async fn create_report(
        &self,
        params: CreateReportParams,
    ) -> Result<IncidentReportRecord, RepoError> {
        self.transact(|tables| {
            let id = tables.reports.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let record = IncidentReportRecord {
                id,
                title: params.title,
                description: params.description,
                location: params.location,
                status: ReportStatus::Open.code(),
                accident_id: params.accident_id,
                department_id: params.department_id,
                reported_by: params.reported_by,
                reported_date: params.reported_date,
                action_plan_id: None,
            };
            tables.reports.push(record.clone());
            Ok(record)
        })
    }

    async fn attach_action_plan(
        &self,
        params: AttachPlanParams,
    ) -> Result<ActionPlanRecord, RepoError> {
        let fail_report_update = self.fail_report_update.load(Ordering::SeqCst);
        self.transact(|tables| {
            let id = tables.plans.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let record = ActionPlanRecord {
                id,
                incident_report_id: params.incident_report_id,
                action_detail: params.action_detail,
                status: PlanStatus::InProgress.code(),
                priority: params.priority.code(),
                action_type: params.action_type.code(),
                due_date: params.due_date,
                completed_date: None,
                maintenance_staff_id: params.maintenance_staff_id,
                remarks: None,
            };
            tables.plans.push(record.clone());

            if fail_report_update {
                return Err(RepoError::Persistence("injected report failure".to_string()));
            }
            let report = tables
                .reports
                .iter_mut()
                .find(|r| r.id == params.incident_report_id)
                .ok_or(RepoError::NotFound)?;
            if report.action_plan_id.is_some() {
                return Err(RepoError::conflict(format!(
                    "incident report {} already has an action plan",
                    params.incident_report_id
                )));
            }
            report.action_plan_id = Some(id);
            report.status = ReportStatus::InProgress.code();
            Ok(record)
        })
    }

    async fn apply_plan_status_change(
        &self,
        change: PlanStatusChange,
    ) -> Result<ActionPlanRecord, RepoError> {
        let fail_report_update = self.fail_report_update.load(Ordering::SeqCst);
        self.transact(|tables| {
            let plan = tables
                .plans
                .iter_mut()
                .find(|p| {
                    p.id == change.action_plan_id
                        && p.incident_report_id == change.incident_report_id
                })
                .ok_or(RepoError::NotFound)?;
            if plan.status().is_some_and(PlanStatus::is_closed) {
                return Err(RepoError::conflict(format!(
                    "action plan {} is already closed",
                    plan.id
                )));
            }
            plan.status = change.status.code();
            plan.remarks = change.remarks.clone();
            if let Some(completed_at) = change.completed_at {
                plan.completed_date = Some(completed_at);
            }
            let updated = plan.clone();

            if let Some(status) = change.report_status {
                if fail_report_update {
                    return Err(RepoError::Persistence("injected report failure".to_string()));
                }
                let report = tables
                    .reports
                    .iter_mut()
                    .find(|r| r.id == change.incident_report_id)
                    .ok_or(RepoError::NotFound)?;
                report.status = status.code();
            }
            Ok(updated)
        })
    }
}

pub fn report(id: i32, accident_id: i32, reported_by: i32, status: ReportStatus) -> IncidentReportRecord {
    IncidentReportRecord {
        id,
        title: format!("Report {id}"),
        description: "Observed on shift".to_string(),
        location: "Warehouse".to_string(),
        status: status.code(),
        accident_id,
        department_id: 1,
        reported_by,
        reported_date: datetime!(2024-03-10 09:30 UTC),
        action_plan_id: None,
    }
}

pub fn plan(id: i32, report_id: i32, status: PlanStatus, team: i32) -> ActionPlanRecord {
    ActionPlanRecord {
        id,
        incident_report_id: report_id,
        action_detail: format!("Fix hazard {id}"),
        status: status.code(),
        priority: 20,
        action_type: 10,
        due_date: datetime!(2024-03-20 00:00 UTC),
        completed_date: (status == PlanStatus::Completed).then_some(datetime!(2024-03-12 00:00 UTC)),
        maintenance_staff_id: team,
        remarks: None,
    }
}

pub fn lookups() -> Tables {
    Tables {
        accidents: vec![
            AccidentRecord {
                id: 1,
                name: "Slip".to_string(),
            },
            AccidentRecord {
                id: 2,
                name: "Fire".to_string(),
            },
        ],
        departments: vec![DepartmentRecord {
            id: 1,
            name: "Operations".to_string(),
        }],
        users: vec![
            UserRecord {
                id: 1,
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                department_id: 1,
            },
            UserRecord {
                id: 2,
                first_name: "Alan".to_string(),
                last_name: "Turing".to_string(),
                department_id: 1,
            },
        ],
        teams: vec![MaintenanceTeamRecord {
            id: 1,
            name: "Facilities".to_string(),
        }],
        ..Default::default()
    }
}

/// Ten reports, each with a plan: seven completed, three in progress.
pub fn seventy_percent_complete() -> InMemoryIncidents {
    let mut tables = lookups();
    for id in 1..=10 {
        let mut record = report(id, 1, 1, ReportStatus::InProgress);
        let status = if id <= 7 {
            record.status = ReportStatus::Resolved.code();
            PlanStatus::Completed
        } else {
            PlanStatus::InProgress
        };
        record.action_plan_id = Some(100 + id);
        tables.reports.push(record);
        tables.plans.push(plan(100 + id, id, status, 1));
    }
    InMemoryIncidents::new(tables)
}

pub fn cache(ttl_seconds: u64) -> Arc<AggregateCache> {
    let config = CacheConfig {
        ttl_seconds,
        ..Default::default()
    };
    Arc::new(AggregateCache::new(&config))
}

pub fn dashboard(repo: Arc<InMemoryIncidents>, cache: Arc<AggregateCache>) -> DashboardService {
    let ttl = std::time::Duration::from_secs(30);
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(NOW));
    DashboardService::new(repo, cache, clock, ttl)
}

pub fn api_state(repo: Arc<InMemoryIncidents>) -> ApiState {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(NOW));
    let reads: Arc<dyn IncidentReadRepo> = repo.clone();
    let writes: Arc<dyn IncidentWriteRepo> = repo.clone();
    ApiState {
        dashboard: dashboard(repo, cache(30)),
        action_plans: ActionPlanService::new(reads.clone(), writes.clone(), clock.clone()),
        reports: ReportService::new(reads, writes, clock),
    }
}
