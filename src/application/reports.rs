use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::clock::Clock;
use crate::application::repos::{
    CreateReportParams, IncidentReadRepo, IncidentWriteRepo, RepoError,
};
use crate::domain::entities::IncidentReportRecord;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub location: String,
    pub accident_id: i32,
    pub reported_by: i32,
}

#[derive(Clone)]
pub struct ReportService {
    reads: Arc<dyn IncidentReadRepo>,
    writes: Arc<dyn IncidentWriteRepo>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
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

    /// File a new open report under the reporter's department.
    pub async fn submit(&self, report: NewReport) -> Result<IncidentReportRecord, ReportError> {
        if report.title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty").into());
        }

        let reporter = self
            .reads
            .find_user(report.reported_by)
            .await?
            .ok_or_else(|| {
                DomainError::validation(format!("unknown reporting user {}", report.reported_by))
            })?;

        let record = self
            .writes
            .create_report(CreateReportParams {
                title: report.title,
                description: report.description,
                location: report.location,
                accident_id: report.accident_id,
                department_id: reporter.department_id,
                reported_by: reporter.id,
                reported_date: self.clock.now(),
            })
            .await?;

        info!(
            incident_report_id = record.id,
            reported_by = record.reported_by,
            "Incident report submitted"
        );
        Ok(record)
    }
}
