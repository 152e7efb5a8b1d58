//! Cache key contract.

use std::hash::Hash;

/// A key usable in [`TtlCache`](super::TtlCache).
///
/// Keys are typed so that logically distinct computations sharing one store
/// cannot collide. The metric label is emitted on every hit/miss counter and
/// must stay low-cardinality.
pub trait CacheKey: Eq + Hash + Clone + Send + Sync + 'static {
    fn metric_label(&self) -> &'static str;
}
