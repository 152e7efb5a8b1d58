//! Aggregate cache.
//!
//! A generic read-through store with one fixed time-to-live per entry. Values
//! are recomputed lazily on the first lookup after expiry; nothing else
//! invalidates them, so readers may see data up to one TTL window old.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! ttl_seconds = 30
//! single_flight = true
//! purge_interval_seconds = 60
//! ```

mod config;
mod keys;
mod store;

pub use config::CacheConfig;
pub use keys::CacheKey;
pub use store::{
    METRIC_CACHE_COALESCED, METRIC_CACHE_COMPUTE_ERROR, METRIC_CACHE_COMPUTE_MS,
    METRIC_CACHE_ENTRIES, METRIC_CACHE_HIT, METRIC_CACHE_MISS, TtlCache,
};
