//! The resident payload of one cache slot.
//!
//! A [`CacheEntry`] is the node type stored inside the intrusive lists in
//! [`crate::list`] and chained inside [`crate::table`]'s hash buckets. It
//! carries every piece of bookkeeping state a shard needs: the owning key,
//! its precomputed hash, the value, the deleter to run on reclaim, the
//! charge it contributes to the shard's usage total, the outstanding
//! reference count, and whether the hash table still considers it resident.

use std::ptr;

use crate::list;

/// A deleter is invoked exactly once, after the last outstanding reference
/// to an entry is released and the entry has left the cache.
pub type Deleter<V> = Box<dyn FnOnce(&[u8], V) + Send>;

pub(crate) struct CacheEntry<V> {
    pub(crate) key: Box<[u8]>,
    pub(crate) key_hash: u32,
    pub(crate) value: Option<V>,
    pub(crate) deleter: Option<Deleter<V>>,
    pub(crate) charge: u64,
    pub(crate) refs: u32,
    pub(crate) in_cache: bool,
    /// Intrusive link for the hash table's chain at this entry's bucket.
    /// Independent of the `prev`/`next` pointers the enclosing
    /// [`list::Entry`] node uses for LRU/in-use list membership.
    pub(crate) table_next: *mut list::Entry<CacheEntry<V>>,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(
        key: Box<[u8]>,
        key_hash: u32,
        value: V,
        deleter: Option<Deleter<V>>,
        charge: u64,
        refs: u32,
        in_cache: bool,
    ) -> Self {
        Self {
            key,
            key_hash,
            value: Some(value),
            deleter,
            charge,
            refs,
            in_cache,
            table_next: ptr::null_mut(),
        }
    }

    /// Consumes the entry, returning the pieces a deleter call needs.
    pub(crate) fn into_parts(mut self) -> (Box<[u8]>, V, Option<Deleter<V>>) {
        let value = self.value.take().expect("entry value present until delete");
        (self.key, value, self.deleter.take())
    }
}
