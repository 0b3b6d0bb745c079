//! A chained hash table keyed by `(hash, key bytes)`, addressing nodes by
//! raw pointer so the same node can simultaneously belong to one of the
//! shard's two intrusive lists.
//!
//! Collision chains are threaded through [`crate::entry::CacheEntry::table_next`]
//! rather than a separate allocation per bucket, and the bucket array is a
//! power-of-two-sized slice that only ever grows: whenever the element
//! count exceeds the bucket count (load factor 1.0), the table doubles and
//! rehashes every chain in place. Shrinking is never attempted — it would
//! require rehashing under write contention for no benefit a read-mostly
//! cache would notice.

use std::ptr;

use crate::entry::CacheEntry;
use crate::list;

type NodePtr<V> = *mut list::Entry<CacheEntry<V>>;

const INITIAL_BUCKETS: usize = 16;

pub(crate) struct Table<V> {
    buckets: Box<[NodePtr<V>]>,
    mask: usize,
    count: usize,
}

impl<V> Table<V> {
    pub(crate) fn new() -> Self {
        Self {
            buckets: vec![ptr::null_mut(); INITIAL_BUCKETS].into_boxed_slice(),
            mask: INITIAL_BUCKETS - 1,
            count: 0,
        }
    }

    fn bucket_index(&self, hash: u32) -> usize {
        (hash as usize) & self.mask
    }

    /// Finds the node stored under `(hash, key)`, if any.
    ///
    /// # Safety
    /// Every node reachable from `self.buckets` must be a valid,
    /// currently-allocated `list::Entry<CacheEntry<V>>`.
    pub(crate) unsafe fn lookup(&self, hash: u32, key: &[u8]) -> Option<NodePtr<V>> {
        let mut node = self.buckets[self.bucket_index(hash)];
        while !node.is_null() {
            // SAFETY: node is non-null and, by the function's safety
            // contract, points at a live CacheEntry.
            let entry = unsafe { (*node).get_value() };
            if entry.key_hash == hash && &*entry.key == key {
                return Some(node);
            }
            node = entry.table_next;
        }
        None
    }

    /// Inserts `node` (already populated with its own `key_hash`) into the
    /// table. Does not check for an existing entry under the same key;
    /// callers must remove any prior entry first (see
    /// [`crate::shard::LruShard::detach_by_key`]).
    ///
    /// # Safety
    /// `node` must not already be linked into this table's chains.
    pub(crate) unsafe fn insert(&mut self, node: NodePtr<V>) {
        self.maybe_grow();
        // SAFETY: node is a valid, freshly-inserted entry.
        let hash = unsafe { (*node).get_value().key_hash };
        let idx = self.bucket_index(hash);
        unsafe {
            (*node).get_value_mut().table_next = self.buckets[idx];
        }
        self.buckets[idx] = node;
        self.count += 1;
    }

    /// Removes and returns the node stored under `(hash, key)`, if any.
    ///
    /// # Safety
    /// Same as [`Self::lookup`].
    pub(crate) unsafe fn remove(&mut self, hash: u32, key: &[u8]) -> Option<NodePtr<V>> {
        let idx = self.bucket_index(hash);
        let mut cur = self.buckets[idx];
        let mut prev: NodePtr<V> = ptr::null_mut();
        while !cur.is_null() {
            // SAFETY: see lookup.
            let entry = unsafe { (*cur).get_value() };
            if entry.key_hash == hash && &*entry.key == key {
                let next = entry.table_next;
                if prev.is_null() {
                    self.buckets[idx] = next;
                } else {
                    unsafe {
                        (*prev).get_value_mut().table_next = next;
                    }
                }
                self.count -= 1;
                return Some(cur);
            }
            prev = cur;
            cur = entry.table_next;
        }
        None
    }

    fn maybe_grow(&mut self) {
        if self.count > self.buckets.len() {
            self.grow();
        }
    }

    fn grow(&mut self) {
        let new_len = self.buckets.len() * 2;
        let new_mask = new_len - 1;
        let mut new_buckets = vec![ptr::null_mut(); new_len].into_boxed_slice();

        for &head in self.buckets.iter() {
            let mut node = head;
            while !node.is_null() {
                // SAFETY: every node in the old bucket array is a valid,
                // currently-allocated entry.
                let entry = unsafe { (*node).get_value_mut() };
                let next = entry.table_next;
                let idx = (entry.key_hash as usize) & new_mask;
                entry.table_next = new_buckets[idx];
                new_buckets[idx] = node;
                node = next;
            }
        }

        self.buckets = new_buckets;
        self.mask = new_mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_key(table: &mut Table<u32>, key: &'static [u8], hash: u32, value: u32) -> NodePtr<u32> {
        let entry = CacheEntry::new(key.to_vec().into_boxed_slice(), hash, value, None, 1, 1, true);
        let node = list::List::alloc_detached(entry);
        unsafe { table.insert(node) };
        node
    }

    #[test]
    fn lookup_finds_inserted_entries() {
        let mut table = Table::<u32>::new();
        let node = insert_key(&mut table, b"a", 1, 100);
        let found = unsafe { table.lookup(1, b"a") };
        assert_eq!(found, Some(node));
        unsafe { drop(Box::from_raw(node)) };
    }

    #[test]
    fn distinguishes_hash_collisions_by_key_bytes() {
        let mut table = Table::<u32>::new();
        let a = insert_key(&mut table, b"a", 7, 1);
        let b = insert_key(&mut table, b"b", 7, 2);
        assert_eq!(unsafe { table.lookup(7, b"a") }, Some(a));
        assert_eq!(unsafe { table.lookup(7, b"b") }, Some(b));
        unsafe {
            drop(Box::from_raw(a));
            drop(Box::from_raw(b));
        }
    }

    #[test]
    fn remove_detaches_from_chain() {
        let mut table = Table::<u32>::new();
        let node = insert_key(&mut table, b"x", 3, 9);
        let removed = unsafe { table.remove(3, b"x") };
        assert_eq!(removed, Some(node));
        assert_eq!(unsafe { table.lookup(3, b"x") }, None);
        unsafe { drop(Box::from_raw(node)) };
    }

    #[test]
    fn grows_past_load_factor_one_and_keeps_all_entries() {
        let mut table = Table::<u32>::new();
        let mut nodes = Vec::new();
        for i in 0..64u32 {
            let key = i.to_le_bytes().to_vec().into_boxed_slice();
            let entry = CacheEntry::new(key.clone(), i, i, None, 1, 1, true);
            let node = list::List::alloc_detached(entry);
            unsafe { table.insert(node) };
            nodes.push((key, node));
        }
        for (key, node) in &nodes {
            let hash = u32::from_le_bytes(key[..4].try_into().unwrap());
            assert_eq!(unsafe { table.lookup(hash, key) }, Some(*node));
        }
        for (_, node) in nodes {
            unsafe { drop(Box::from_raw(node)) };
        }
    }
}
