//! Ambient observability for the cache.
//!
//! The core has no status/error channel and no logging dependency (see
//! the crate-level docs), so metrics are the one ambient signal a caller
//! gets for free. Each shard tracks its own [`CoreCacheMetrics`]; the
//! facade aggregates them into a single deterministically-ordered
//! `BTreeMap` the same way a sharded cache would combine per-segment
//! counters — summed key by key, not kept as separate per-shard reports.

use std::collections::BTreeMap;

/// Counters tracked by a single shard.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Lookups that found a resident entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries evicted to make room for new charge.
    pub evictions: u64,
    /// Entries inserted (including overwrites).
    pub insertions: u64,
    /// Total charge evicted so far.
    pub charge_evicted: u64,
    /// Total charge inserted so far (not charge currently resident).
    pub charge_inserted: u64,
    /// This shard's configured capacity.
    pub capacity: u64,
}

impl CoreCacheMetrics {
    /// Creates a zeroed counter set for a shard with the given capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Records a lookup that found a resident entry.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records a lookup that found nothing.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records an insertion of `charge` units.
    pub fn record_insertion(&mut self, charge: u64) {
        self.insertions += 1;
        self.charge_inserted += charge;
    }

    /// Records an eviction of `charge` units.
    pub fn record_eviction(&mut self, charge: u64) {
        self.evictions += 1;
        self.charge_evicted += charge;
    }

    /// Hit rate over all recorded lookups, or `0.0` if none were recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Flattens every counter into a deterministically-ordered `BTreeMap`.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("hits".to_string(), self.hits as f64);
        m.insert("misses".to_string(), self.misses as f64);
        m.insert("hit_rate".to_string(), self.hit_rate());
        m.insert("evictions".to_string(), self.evictions as f64);
        m.insert("insertions".to_string(), self.insertions as f64);
        m.insert("charge_evicted".to_string(), self.charge_evicted as f64);
        m.insert("charge_inserted".to_string(), self.charge_inserted as f64);
        m.insert("capacity".to_string(), self.capacity as f64);
        m
    }
}

/// Implemented by anything that can report its metrics as a deterministically
/// ordered set of counters, suitable for logging, export, or assertions in
/// tests.
pub trait CacheMetrics {
    /// All tracked metrics, keyed by name, in deterministic (alphabetical)
    /// order.
    fn metrics(&self) -> BTreeMap<String, f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_with_no_requests() {
        let m = CoreCacheMetrics::new(100);
        assert_eq!(m.hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_reflects_hits_and_misses() {
        let mut m = CoreCacheMetrics::new(100);
        m.record_hit();
        m.record_hit();
        m.record_miss();
        assert!((m.hit_rate() - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn to_btreemap_is_deterministically_ordered() {
        let m = CoreCacheMetrics::new(10);
        let keys: Vec<&String> = m.to_btreemap().keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
