//! A single-lock LRU shard: a hash table plus two intrusive lists plus
//! charge accounting.
//!
//! The dual-list design is what lets [`LruShard::release`] move an entry
//! from pinned to evictable in O(1) without ever scanning a list: a naive
//! "one LRU list, skip pinned entries during eviction" design cannot tell
//! pinned from unpinned entries without scanning, which breaks bounding
//! cache usage while many entries are pinned.
//!
//! Every method here runs under the shard's mutex (held by the caller in
//! [`crate::cache`]); deleters for entries that drop to zero references
//! are never invoked here — they are collected into `to_delete` and run by
//! the caller after the lock is released, per the no-lock-held-during-
//! deleter-invocation rule.

use crate::entry::{CacheEntry, Deleter};
use crate::list::{self, List};
use crate::metrics::CoreCacheMetrics;
use crate::table::Table;

type NodePtr<V> = *mut list::Entry<CacheEntry<V>>;

/// One `(key, value, deleter)` tuple pending deletion outside the shard lock.
pub(crate) type Reclaimed<V> = (Box<[u8]>, V, Option<Deleter<V>>);

pub(crate) struct LruShard<V> {
    table: Table<V>,
    /// Entries with `refs == 1`, held only by the cache. Oldest at the
    /// head (evicted first); newly unpinned entries land at the tail.
    lru: List<CacheEntry<V>>,
    /// Entries with `refs >= 2`: at least one outstanding handle. Order is
    /// irrelevant; membership alone prevents eviction.
    in_use: List<CacheEntry<V>>,
    usage: u64,
    capacity: u64,
    pub(crate) metrics: CoreCacheMetrics,
}

// SAFETY: LruShard's only non-Send fields are the raw-pointer-based
// `table`/`lru`/`in_use` structures, all of which only ever hold pointers
// to entries owned exclusively by this shard and only ever touched while
// the shard's mutex is held. Sending the whole shard to another thread is
// sound whenever `V` itself is.
unsafe impl<V: Send> Send for LruShard<V> {}

impl<V> LruShard<V> {
    pub(crate) fn new(capacity: u64) -> Self {
        Self {
            table: Table::new(),
            lru: List::new(),
            in_use: List::new(),
            usage: 0,
            capacity,
            metrics: CoreCacheMetrics::new(capacity),
        }
    }

    pub(crate) fn total_charge(&self) -> u64 {
        self.usage
    }

    /// Inserts a new entry under `(key, hash)`, evicting from the LRU list
    /// as needed to respect `capacity`, and returns a pinned node pointer.
    pub(crate) fn insert(
        &mut self,
        key: Box<[u8]>,
        hash: u32,
        value: V,
        charge: u64,
        deleter: Option<Deleter<V>>,
        to_delete: &mut Vec<Reclaimed<V>>,
    ) -> NodePtr<V> {
        self.metrics.record_insertion(charge);

        if self.capacity == 0 {
            let entry = CacheEntry::new(key, hash, value, deleter, charge, 1, false);
            return List::alloc_detached(entry);
        }

        // Overwrite: detach any prior entry under this key first so the
        // hash table never holds two entries for the same key.
        self.detach_by_key(hash, &key, to_delete);

        let entry = CacheEntry::new(key, hash, value, deleter, charge, 2, true);
        let node = self.in_use.add_unchecked(entry);
        // SAFETY: node was just allocated, is not yet linked into the
        // table, and key_hash matches the key just stored in it.
        unsafe { self.table.insert(node) };
        self.usage += charge;

        while self.usage > self.capacity {
            let Some(boxed) = self.lru.remove_first() else {
                break;
            };
            let victim = Box::into_raw(boxed);
            self.metrics.record_eviction(
                // SAFETY: victim was just detached from the LRU list and is
                // a live, fully-populated entry.
                unsafe { (*victim).get_value().charge },
            );
            self.detach_known_lru(victim, to_delete);
        }

        node
    }

    /// Looks up `(key, hash)`, pinning the entry (moving it from the LRU
    /// list to the in-use list on its first outstanding handle) if found.
    pub(crate) fn lookup(&mut self, hash: u32, key: &[u8]) -> Option<NodePtr<V>> {
        // SAFETY: every node reachable via self.table belongs to this shard.
        let node = unsafe { self.table.lookup(hash, key) }?;
        self.metrics.record_hit();
        unsafe {
            let was_lru_only = (*node).get_value().refs == 1;
            if was_lru_only {
                let boxed = self
                    .lru
                    .remove(node)
                    .expect("refs==1 && in_cache implies LRU-list membership");
                self.in_use.attach_from_other_list(Box::into_raw(boxed));
            }
            (*node).get_value_mut().refs += 1;
        }
        Some(node)
    }

    pub(crate) fn record_miss(&mut self) {
        self.metrics.record_miss();
    }

    /// Releases one outstanding handle on `node`. If that was the last
    /// reference, the entry is reclaimed into `to_delete`; if it was the
    /// last *outstanding handle* but the entry is still cached, it moves
    /// back onto the LRU list.
    pub(crate) fn release(&mut self, node: NodePtr<V>, to_delete: &mut Vec<Reclaimed<V>>) {
        self.unref(node, to_delete);
    }

    /// Finds and fully detaches the entry under `(hash, key)`, if any.
    pub(crate) fn detach_by_key(
        &mut self,
        hash: u32,
        key: &[u8],
        to_delete: &mut Vec<Reclaimed<V>>,
    ) -> bool {
        // SAFETY: see lookup.
        let Some(node) = (unsafe { self.table.remove(hash, key) }) else {
            return false;
        };
        // SAFETY: node was just detached from the table and is a live entry
        // currently linked into exactly one of lru/in_use (invariant: every
        // in_cache entry is on exactly one list).
        unsafe {
            let refs_before = (*node).get_value().refs;
            let boxed = if refs_before == 1 {
                self.lru.remove(node)
            } else {
                self.in_use.remove(node)
            }
            .expect("in_cache entry must be linked into lru or in_use");
            let node = Box::into_raw(boxed);
            let e = (*node).get_value_mut();
            e.in_cache = false;
            self.usage -= e.charge;
            self.unref(node, to_delete);
        }
        true
    }

    /// Evicts every currently-unpinned (LRU-list) entry immediately.
    /// Pinned entries on the in-use list are untouched.
    pub(crate) fn prune(&mut self, to_delete: &mut Vec<Reclaimed<V>>) {
        while let Some(boxed) = self.lru.remove_first() {
            let node = Box::into_raw(boxed);
            self.detach_known_lru(node, to_delete);
        }
    }

    /// Detaches a node already known to be (just popped from) the LRU
    /// list: removes it from the table, marks it uncached, and gives up
    /// the cache's own reference.
    fn detach_known_lru(&mut self, node: NodePtr<V>, to_delete: &mut Vec<Reclaimed<V>>) {
        // SAFETY: node came from `lru.remove_first`, so it is a live,
        // currently-unlinked entry that was, until just now, in_cache.
        unsafe {
            let e = (*node).get_value_mut();
            self.table.remove(e.key_hash, &e.key);
            e.in_cache = false;
            self.usage -= e.charge;
        }
        self.unref(node, to_delete);
    }

    /// Decrements `node`'s reference count. At zero, reclaims the entry.
    /// At one, while still cached, moves it from the in-use list back onto
    /// the LRU list (now evictable).
    ///
    /// # Safety
    /// `node` must be a currently-live entry; if its refcount reaches zero
    /// it must already be detached from both lists (`in_cache == false`).
    fn unref(&mut self, node: NodePtr<V>, to_delete: &mut Vec<Reclaimed<V>>) {
        unsafe {
            let e = (*node).get_value_mut();
            e.refs -= 1;
            let refs = e.refs;
            let in_cache = e.in_cache;

            if refs == 0 {
                debug_assert!(
                    !in_cache,
                    "entry reached refs == 0 while still marked in_cache"
                );
                let boxed = Box::from_raw(node);
                let entry = boxed.into_inner();
                to_delete.push(entry.into_parts());
            } else if refs == 1 && in_cache {
                let boxed = self
                    .in_use
                    .remove(node)
                    .expect("refs>=2 && in_cache implies in-use-list membership");
                self.lru.attach_last_from_other_list(Box::into_raw(boxed));
            }
        }
    }
}
