//! Read-through TTL store.
//!
//! One entry per key, overwritten on every recomputation. An entry is never
//! served once `now >= expires_at`; expired entries stay in memory until the
//! next write for the key or the next [`TtlCache::purge_expired`] sweep.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use metrics::{counter, gauge, histogram};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::keys::CacheKey;

pub const METRIC_CACHE_HIT: &str = "incidentdesk_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "incidentdesk_cache_miss_total";
pub const METRIC_CACHE_COALESCED: &str = "incidentdesk_cache_coalesced_total";
pub const METRIC_CACHE_COMPUTE_ERROR: &str = "incidentdesk_cache_compute_error_total";
pub const METRIC_CACHE_COMPUTE_MS: &str = "incidentdesk_cache_compute_ms";
pub const METRIC_CACHE_ENTRIES: &str = "incidentdesk_cache_entries";

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Removes a key's flight lock once no caller holds or awaits it, so the
/// map only ever holds keys with a miss in progress. Runs on cancellation too.
struct FlightRelease<'a, K: CacheKey> {
    flights: &'a DashMap<K, Arc<Mutex<()>>>,
    key: K,
}

impl<K: CacheKey> Drop for FlightRelease<'_, K> {
    fn drop(&mut self) {
        // Clones are taken under the shard lock, so a count of one means
        // only the map itself still references this lock.
        self.flights
            .remove_if(&self.key, |_, flight| Arc::strong_count(flight) == 1);
    }
}

/// Concurrent key -> (value, expiry) table with read-through semantics.
///
/// Reads and writes on different keys never contend beyond the map shard.
/// With single-flight enabled, concurrent misses on one key wait for a single
/// computation; otherwise racing misses all compute and the last write wins.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    flights: DashMap<K, Arc<Mutex<()>>>,
    single_flight: bool,
}

impl<K, V> TtlCache<K, V>
where
    K: CacheKey,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            flights: DashMap::new(),
            single_flight: config.single_flight,
        }
    }

    /// Return the stored value if it has not expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.entries.get(key)?;
        (Instant::now() < entry.expires_at).then(|| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
        gauge!(METRIC_CACHE_ENTRIES).set(self.entries.len() as f64);
    }

    /// Serve a fresh entry, or run `compute` and store its result.
    ///
    /// A failed computation writes nothing and its error is returned as-is,
    /// so the next call retries.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        if let Some(value) = self.get(&key) {
            counter!(METRIC_CACHE_HIT, "key" => key.metric_label()).increment(1);
            return Ok(value);
        }
        counter!(METRIC_CACHE_MISS, "key" => key.metric_label()).increment(1);

        if !self.single_flight {
            return self.compute_and_store(key, ttl, compute).await;
        }

        // Declared first so it drops last, after the guard and our handle.
        let _release = FlightRelease {
            flights: &self.flights,
            key: key.clone(),
        };
        let flight = Arc::clone(self.flights.entry(key.clone()).or_default().value());
        let _guard = flight.lock().await;

        if let Some(value) = self.get(&key) {
            counter!(METRIC_CACHE_COALESCED, "key" => key.metric_label()).increment(1);
            return Ok(value);
        }

        self.compute_and_store(key, ttl, compute).await
    }

    async fn compute_and_store<F, Fut, E>(&self, key: K, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        let started_at = std::time::Instant::now();
        let outcome = compute().await;
        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(value) => {
                histogram!(METRIC_CACHE_COMPUTE_MS, "key" => key.metric_label()).record(elapsed_ms);
                debug!(
                    key = key.metric_label(),
                    elapsed_ms,
                    ttl_secs = ttl.as_secs(),
                    "Cache entry computed"
                );
                self.set(key, value.clone(), ttl);
                Ok(value)
            }
            Err(err) => {
                counter!(METRIC_CACHE_COMPUTE_ERROR, "key" => key.metric_label()).increment(1);
                warn!(
                    key = key.metric_label(),
                    elapsed_ms,
                    error = %err,
                    "Cache computation failed; entry left empty"
                );
                Err(err)
            }
        }
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
        gauge!(METRIC_CACHE_ENTRIES).set(self.entries.len() as f64);
    }

    pub fn clear(&self) {
        self.entries.clear();
        gauge!(METRIC_CACHE_ENTRIES).set(0.0);
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        let after = self.entries.len();
        gauge!(METRIC_CACHE_ENTRIES).set(after as f64);
        before.saturating_sub(after)
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
