//! Cache configuration.
//!
//! Controls the aggregate cache via the `[cache]` table of `incidentdesk.toml`.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECS: u64 = 30;
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 60;

/// Aggregate cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of every cached aggregate, in seconds.
    pub ttl_seconds: u64,
    /// Collapse concurrent misses on the same key into one computation.
    pub single_flight: bool,
    /// How often expired entries are swept from memory, in seconds.
    pub purge_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECS,
            single_flight: true,
            purge_interval_seconds: DEFAULT_PURGE_INTERVAL_SECS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl_seconds: settings.ttl.as_secs(),
            single_flight: settings.single_flight,
            purge_interval_seconds: settings.purge_interval.as_secs(),
        }
    }
}

impl CacheConfig {
    /// Entry lifetime, clamped to at least one second.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds.max(1))
    }

    /// Sweep cadence, clamped to at least one second.
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_seconds.max(1))
    }
}
