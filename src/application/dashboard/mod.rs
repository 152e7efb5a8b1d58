//! Cached dashboard aggregates.
//!
//! Every aggregate is served through the shared [`AggregateCache`]. Bundles
//! fan out one lookup per key on its own task, so a fresh hit never waits on
//! another key's recomputation and a dropped request still lets in-flight
//! computations populate the cache.

mod bundle;
mod catalog;
pub(crate) mod queries;
pub mod views;

pub use bundle::AggregateBundle;
pub use catalog::{AggregateKey, AggregateValue, UnknownAggregate, compute};
pub use queries::{MonthWindow, UNASSIGNED_TEAM};

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::application::clock::Clock;
use crate::application::repos::{IncidentReadRepo, RepoError};
use crate::cache::TtlCache;

pub type AggregateCache = TtlCache<AggregateKey, AggregateValue>;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("aggregate `{key}` could not be computed: {source}")]
    Repo {
        key: AggregateKey,
        #[source]
        source: RepoError,
    },
    #[error("aggregate `{key}` task failed: {message}")]
    Task { key: AggregateKey, message: String },
}

impl AggregateError {
    pub fn key(&self) -> AggregateKey {
        match self {
            AggregateError::Repo { key, .. } | AggregateError::Task { key, .. } => *key,
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    reads: Arc<dyn IncidentReadRepo>,
    cache: Arc<AggregateCache>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl DashboardService {
    pub fn new(
        reads: Arc<dyn IncidentReadRepo>,
        cache: Arc<AggregateCache>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            reads,
            cache,
            clock,
            ttl,
        }
    }

    pub fn cache(&self) -> &Arc<AggregateCache> {
        &self.cache
    }

    /// Serve one aggregate through the cache.
    pub async fn aggregate(&self, key: AggregateKey) -> Result<AggregateValue, AggregateError> {
        let reads = Arc::clone(&self.reads);
        let clock = Arc::clone(&self.clock);

        self.cache
            .get_or_compute(key, self.ttl, || async move {
                let now = clock.now();
                compute(key, reads.as_ref(), now)
                    .await
                    .map_err(|source| AggregateError::Repo { key, source })
            })
            .await
    }

    /// Serve several aggregates concurrently. The first failure fails the
    /// whole bundle; repeated keys are fetched once.
    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    pub async fn fetch_bundle(
        &self,
        keys: &[AggregateKey],
    ) -> Result<AggregateBundle, AggregateError> {
        let mut unique: Vec<AggregateKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(key) {
                unique.push(*key);
            }
        }

        let lookups = unique.into_iter().map(|key| {
            let service = self.clone();
            let handle = tokio::spawn(async move { service.aggregate(key).await });
            async move {
                let value = handle.await.map_err(|err| AggregateError::Task {
                    key,
                    message: err.to_string(),
                })??;
                Ok::<_, AggregateError>((key, value))
            }
        });

        let entries = try_join_all(lookups).await?;
        debug!(served = entries.len(), "Aggregate bundle assembled");
        Ok(AggregateBundle::new(entries))
    }

    pub async fn reports_overview(&self) -> Result<AggregateBundle, AggregateError> {
        self.fetch_bundle(&AggregateKey::REPORTS_OVERVIEW).await
    }

    pub async fn action_plan_charts(&self) -> Result<AggregateBundle, AggregateError> {
        self.fetch_bundle(&AggregateKey::ACTION_PLAN_CHARTS).await
    }
}
