//! The sharded, concurrent facade over [`crate::shard::LruShard`].
//!
//! `Cache<V>` partitions its capacity across independently-locked shards:
//! each operation hashes its key once and locks exactly one shard, so
//! unrelated keys never contend. `Prune` and `TotalCharge` are the two
//! cross-shard operations; both take shard locks one at a time, in order,
//! so no nested lock acquisition is ever required.
//!
//! Deleters never run with a shard lock held: every operation collects
//! reclaimed `(key, value, deleter)` triples into a local `Vec` inside the
//! critical section and invokes them only after the guard drops.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::CacheConfig;
use crate::entry::Deleter;
use crate::hash;
use crate::list;
use crate::metrics::CacheMetrics;
use crate::shard::{LruShard, Reclaimed};

type NodePtr<V> = *mut list::Entry<crate::entry::CacheEntry<V>>;

struct Inner<V> {
    shards: Box<[Mutex<LruShard<V>>]>,
    next_id: AtomicU64,
}

/// A concurrent, bounded, weighted LRU cache.
///
/// Cloning a `Cache` is cheap (an `Arc` bump) and yields another handle onto
/// the same shards, the idiomatic-Rust way to give every thread its own
/// `Cache` value instead of requiring callers to wrap it in `Arc`
/// themselves: every `Cache` is concurrent by construction, so it owns its
/// `Arc` internally.
pub struct Cache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("shards", &self.inner.shards.len())
            .field("total_charge", &self.total_charge())
            .finish()
    }
}

impl<V> Cache<V> {
    /// Creates a cache from `config`, allocating one [`LruShard`] per
    /// configured shard with an even (rounded up) split of `capacity`.
    pub fn new(config: CacheConfig) -> Self {
        let shard_capacity = config.shard_capacity();
        let shards: Vec<_> = (0..config.shards().get())
            .map(|_| Mutex::new(LruShard::new(shard_capacity)))
            .collect();
        Self {
            inner: Arc::new(Inner {
                shards: shards.into_boxed_slice(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Selects the shard for a precomputed key hash using its high-order
    /// bits, via a fixed-point multiply so any shard count — not just a
    /// power of two — distributes hashes evenly, the same "multiply-high"
    /// trick used to map a hash into an arbitrary-sized range without a
    /// modulo-induced bias toward low shard indices.
    fn shard_index(&self, hash: u32) -> usize {
        let shards = self.inner.shards.len() as u64;
        (((hash as u64) * shards) >> 32) as usize
    }

    /// Inserts `value` under `key` with the given `charge`, running
    /// `deleter` exactly once when the entry is later evicted or erased and
    /// fully unpinned. Returns a pinned [`Handle`] that must be released
    /// (explicitly or by drop) before the entry can be reclaimed.
    ///
    /// If an entry already lives under `key`, it is detached first; its
    /// deleter runs once every outstanding handle on it (including this
    /// call's predecessor) has been released.
    pub fn insert(&self, key: &[u8], value: V, charge: u64, deleter: Option<Deleter<V>>) -> Handle<V> {
        let h = hash::hash(key, 0);
        let shard_idx = self.shard_index(h);
        let mut to_delete: Vec<Reclaimed<V>> = Vec::new();
        let node = {
            let mut shard = self.inner.shards[shard_idx].lock();
            shard.insert(key.to_vec().into_boxed_slice(), h, value, charge, deleter, &mut to_delete)
        };
        run_deleters(to_delete);
        Handle {
            inner: Arc::clone(&self.inner),
            shard_idx,
            node,
        }
    }

    /// Looks up `key`, pinning and returning its entry if resident. A
    /// present entry held only by the cache (i.e. on the LRU list) moves
    /// to the in-use list on its first outstanding handle.
    pub fn lookup(&self, key: &[u8]) -> Option<Handle<V>> {
        let h = hash::hash(key, 0);
        let shard_idx = self.shard_index(h);
        let mut shard = self.inner.shards[shard_idx].lock();
        let node = shard.lookup(h, key);
        if node.is_none() {
            shard.record_miss();
        }
        drop(shard);
        node.map(|node| Handle {
            inner: Arc::clone(&self.inner),
            shard_idx,
            node,
        })
    }

    /// Releases `handle`, equivalent to dropping it. Prefer letting the
    /// handle drop, or [`Handle::release`] for an explicit early release
    /// without introducing a new scope.
    pub fn release(&self, handle: Handle<V>) {
        drop(handle);
    }

    /// Erases the entry under `key`, if any, running its deleter once the
    /// last outstanding handle (if any) is released. A no-op if `key` is
    /// absent.
    pub fn erase(&self, key: &[u8]) {
        let h = hash::hash(key, 0);
        let shard_idx = self.shard_index(h);
        let mut to_delete: Vec<Reclaimed<V>> = Vec::new();
        {
            let mut shard = self.inner.shards[shard_idx].lock();
            shard.detach_by_key(h, key, &mut to_delete);
        }
        run_deleters(to_delete);
    }

    /// Returns a new, strictly monotonically increasing, nonzero 64-bit
    /// identifier. Unlike per-shard state, the counter lives on the facade
    /// so identifiers are globally ordered regardless of which shard a
    /// caller's keys land in.
    pub fn new_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Evicts every currently-unpinned entry across every shard
    /// immediately. Entries with an outstanding handle are left untouched.
    pub fn prune(&self) {
        let mut to_delete: Vec<Reclaimed<V>> = Vec::new();
        for shard_mutex in self.inner.shards.iter() {
            let mut shard = shard_mutex.lock();
            shard.prune(&mut to_delete);
        }
        run_deleters(to_delete);
    }

    /// Sum of `charge` over every currently resident entry, across all
    /// shards.
    pub fn total_charge(&self) -> u64 {
        self.inner.shards.iter().map(|s| s.lock().total_charge()).sum()
    }

    /// Returns the number of shards this cache was built with.
    pub fn shard_count(&self) -> usize {
        self.inner.shards.len()
    }
}

impl<V> CacheMetrics for Cache<V> {
    /// Aggregates every shard's [`crate::metrics::CoreCacheMetrics`] into a
    /// single deterministically-ordered report.
    fn metrics(&self) -> std::collections::BTreeMap<String, f64> {
        let mut aggregated = std::collections::BTreeMap::new();
        for shard_mutex in self.inner.shards.iter() {
            let shard = shard_mutex.lock();
            for (key, value) in shard.metrics.to_btreemap() {
                *aggregated.entry(key).or_insert(0.0) += value;
            }
        }
        aggregated
    }
}

/// Creates a [`Cache`] with the default shard count for this machine.
/// `capacity` may be `0`, in which case the cache admits nothing
/// persistently: every insert is its own immediate eviction.
pub fn new_lru_cache<V>(capacity: u64) -> Cache<V> {
    Cache::new(CacheConfig::new(capacity))
}

fn run_deleters<V>(to_delete: Vec<Reclaimed<V>>) {
    for (key, value, deleter) in to_delete {
        if let Some(deleter) = deleter {
            deleter(&key, value);
        }
    }
}

/// An outstanding pin on one cache entry.
///
/// While a `Handle` is alive, the entry it names cannot be evicted and its
/// deleter cannot run. Dropping the handle — or calling
/// [`Handle::release`] — releases the pin; once every outstanding handle
/// on a detached entry has been released, its deleter runs exactly once.
///
/// A `Handle` is only valid against the [`Cache`] that produced it;
/// nothing prevents releasing it against the right cache from a different
/// thread than the one that created it — any thread may release any
/// handle.
pub struct Handle<V> {
    inner: Arc<Inner<V>>,
    shard_idx: usize,
    node: NodePtr<V>,
}

// SAFETY: a Handle only ever touches its entry through the owning shard's
// mutex (in `Drop`/`value`), so moving or sharing it across threads is
// sound whenever V itself is Send/Sync.
unsafe impl<V: Send> Send for Handle<V> {}
unsafe impl<V: Sync> Sync for Handle<V> {}

impl<V> Handle<V> {
    /// Returns a reference to the pinned entry's value. Reads without
    /// taking the shard lock: `value` is written once at `insert` and
    /// cleared only when the entry is reclaimed, which cannot happen while
    /// any handle — including this one — still pins it.
    pub fn value(&self) -> &V {
        // SAFETY: `node` is live and pinned by this handle's outstanding
        // reference, so no other code path can reclaim it while `self`
        // exists, and its `value` is populated until reclamation.
        unsafe {
            (*self.node)
                .get_value()
                .value
                .as_ref()
                .expect("value present while pinned")
        }
    }

    /// Releases this handle early. Equivalent to dropping it; provided so
    /// callers can release without introducing a new scope.
    pub fn release(self) {}
}

impl<V> fmt::Debug for Handle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("shard", &self.shard_idx).finish()
    }
}

impl<V> Drop for Handle<V> {
    fn drop(&mut self) {
        let mut to_delete: Vec<Reclaimed<V>> = Vec::new();
        {
            let mut shard = self.inner.shards[self.shard_idx].lock();
            shard.release(self.node, &mut to_delete);
        }
        run_deleters(to_delete);
    }
}
