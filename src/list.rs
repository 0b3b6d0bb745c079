//! Intrusive doubly linked list used for the LRU list and the in-use list.
//!
//! Nodes are allocated individually and addressed by raw pointer, exactly
//! as a hash-table entry would need to be addressed from outside any one
//! list: a node can be detached from one `List` and attached to a different
//! `List` in O(1) without reallocating, which is how a shard moves an entry
//! between "pinned" and "evictable" on every `Lookup`/`Release`.
//!
//! Sentinel (sigil) nodes at head and tail remove the need for null checks
//! in the common attach/detach paths.

use std::fmt;
use std::mem;
use std::ptr;

/// A node in the doubly linked list. Not meant to be used directly by
/// callers outside this module; shards address nodes only by the raw
/// pointer returned from [`List::add_unchecked`] or [`List::alloc_detached`].
pub struct Entry<T> {
    val: mem::MaybeUninit<T>,
    prev: *mut Entry<T>,
    next: *mut Entry<T>,
}

impl<T> Entry<T> {
    fn new(val: T) -> Self {
        Entry {
            val: mem::MaybeUninit::new(val),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    fn new_sigil() -> Self {
        Entry {
            val: mem::MaybeUninit::uninit(),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// # Safety
    /// Must only be called on a non-sigil node.
    pub unsafe fn get_value(&self) -> &T {
        unsafe { self.val.assume_init_ref() }
    }

    /// # Safety
    /// Must only be called on a non-sigil node.
    pub unsafe fn get_value_mut(&mut self) -> &mut T {
        unsafe { self.val.assume_init_mut() }
    }

    /// Consumes a boxed node, returning its value.
    ///
    /// # Safety
    /// `self` must be a non-sigil node (i.e. allocated via
    /// [`List::add_unchecked`] or [`List::alloc_detached`], not the
    /// sentinel nodes created by `List::new`).
    pub unsafe fn into_inner(self: Box<Self>) -> T {
        let entry = *self;
        unsafe { entry.val.assume_init() }
    }
}

/// A doubly linked list of intrusive nodes, used without the notion of a
/// fixed item-count capacity: shard capacity is enforced by charge
/// accounting, not by list length, so every insertion here goes through
/// the unchecked paths.
pub struct List<T> {
    len: usize,
    head: *mut Entry<T>,
    tail: *mut Entry<T>,
}

impl<T> List<T> {
    /// Creates a new, empty list.
    pub fn new() -> List<T> {
        let head = Box::into_raw(Box::new(Entry::new_sigil()));
        let tail = Box::into_raw(Box::new(Entry::new_sigil()));
        let list = List { len: 0, head, tail };
        // SAFETY: head and tail are newly allocated and valid.
        unsafe {
            (*list.head).next = list.tail;
            (*list.tail).prev = list.head;
        }
        list
    }

    /// Allocates a node holding `val` that is a member of no list. Used for
    /// the zero-capacity-cache path, where an entry is handed back as a
    /// pinned handle without ever joining the LRU or in-use list.
    pub fn alloc_detached(val: T) -> *mut Entry<T> {
        Box::into_raw(Box::new(Entry::new(val)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes and returns the node at the head of the list (the oldest
    /// entry, by this crate's convention of appending at the tail).
    pub fn remove_first(&mut self) -> Option<Box<Entry<T>>> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: head/tail are valid and the list is non-empty.
        let next = unsafe { (*self.head).next };
        unsafe { self._detach(next) };
        self.len -= 1;
        // SAFETY: next was just detached and was heap-allocated via Box.
        unsafe { Some(Box::from_raw(next)) }
    }

    /// Detaches `node` from this list and returns ownership of it.
    ///
    /// # Safety
    /// `node` must be a non-sigil node currently linked into this list.
    pub unsafe fn remove(&mut self, node: *mut Entry<T>) -> Option<Box<Entry<T>>> {
        if self.is_empty() || node.is_null() || node == self.head || node == self.tail {
            return None;
        }
        unsafe {
            self._detach(node);
        }
        self.len -= 1;
        // SAFETY: caller guarantees node was heap-allocated via Box and is
        // part of this list.
        unsafe { Some(Box::from_raw(node)) }
    }

    /// # Safety
    /// `node`'s `prev`/`next` must point at valid neighbors (i.e. it must
    /// currently be linked into some list).
    unsafe fn _detach(&mut self, node: *mut Entry<T>) {
        unsafe {
            (*(*node).prev).next = (*node).next;
            (*(*node).next).prev = (*node).prev;
        }
    }

    /// Attaches `node` immediately after the head sentinel.
    ///
    /// # Safety
    /// `node` must not already be linked into any list.
    unsafe fn attach(&mut self, node: *mut Entry<T>) {
        unsafe {
            (*node).next = (*self.head).next;
            (*node).prev = self.head;
            (*self.head).next = node;
            (*(*node).next).prev = node;
        }
    }

    /// Attaches `node` immediately before the tail sentinel.
    ///
    /// # Safety
    /// `node` must not already be linked into any list.
    unsafe fn attach_last(&mut self, node: *mut Entry<T>) {
        unsafe {
            (*node).next = self.tail;
            (*node).prev = (*self.tail).prev;
            (*self.tail).prev = node;
            (*(*node).prev).next = node;
        }
    }

    /// Moves a node detached from a different `List` to the front of this
    /// one, incrementing this list's length.
    ///
    /// # Safety
    /// `node` must not already be linked into any list (typically the
    /// `Box` just returned from another list's `remove`/`remove_first`,
    /// converted back to a raw pointer via `Box::into_raw`).
    pub unsafe fn attach_from_other_list(&mut self, node: *mut Entry<T>) {
        unsafe { self.attach(node) };
        self.len += 1;
    }

    /// Moves a node detached from a different `List` to the back of this
    /// one, incrementing this list's length. Used to land a just-unpinned
    /// entry at the most-recently-used end of the LRU list.
    ///
    /// # Safety
    /// Same as [`Self::attach_from_other_list`].
    pub unsafe fn attach_last_from_other_list(&mut self, node: *mut Entry<T>) {
        unsafe { self.attach_last(node) };
        self.len += 1;
    }

    /// Allocates a new node holding `v` and attaches it to the front,
    /// bypassing any notion of list capacity: eviction is driven by charge
    /// accounting in the owning shard, not by list length.
    pub fn add_unchecked(&mut self, v: T) -> *mut Entry<T> {
        let node = Box::into_raw(Box::new(Entry::new(v)));
        // SAFETY: node was just allocated and is linked into no list.
        unsafe { self.attach(node) };
        self.len += 1;
        node
    }

    /// Clears the list, dropping every entry's value.
    pub fn clear(&mut self) {
        while self.remove_first().is_some() {}
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: head and tail were allocated via Box in `new` and are
        // never freed elsewhere.
        unsafe {
            drop(Box::from_raw(self.head));
            drop(Box::from_raw(self.tail));
        }
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List").field("length", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_is_empty() {
        let list = List::<u32>::new();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn add_unchecked_and_remove_first_is_lifo() {
        let mut list = List::<u32>::new();
        list.add_unchecked(10);
        list.add_unchecked(20);
        list.add_unchecked(30);
        assert_eq!(list.len(), 3);

        let first = list.remove_first().unwrap();
        assert_eq!(unsafe { first.val.assume_init() }, 30);
        let second = list.remove_first().unwrap();
        assert_eq!(unsafe { second.val.assume_init() }, 20);
        let third = list.remove_first().unwrap();
        assert_eq!(unsafe { third.val.assume_init() }, 10);
        assert!(list.is_empty());
    }

    #[test]
    fn cross_list_transfer_preserves_value_and_updates_lengths() {
        let mut lru = List::<u32>::new();
        let mut in_use = List::<u32>::new();

        let node = lru.add_unchecked(42);
        assert_eq!(lru.len(), 1);

        let boxed = unsafe { lru.remove(node) }.unwrap();
        assert_eq!(lru.len(), 0);

        unsafe { in_use.attach_last_from_other_list(Box::into_raw(boxed)) };
        assert_eq!(in_use.len(), 1);

        let back = in_use.remove_first().unwrap();
        assert_eq!(unsafe { back.val.assume_init() }, 42);
    }

    #[test]
    fn alloc_detached_is_not_linked_into_any_list() {
        let node = List::<u32>::alloc_detached(7);
        // SAFETY: node is a freshly allocated, non-sigil node.
        let value = unsafe { (*node).get_value() };
        assert_eq!(*value, 7);
        // Caller owns this node; reclaim it to avoid leaking in the test.
        unsafe { drop(Box::from_raw(node)) };
    }

    #[test]
    fn clear_drops_all_entries() {
        let mut list = List::<String>::new();
        list.add_unchecked(String::from("a"));
        list.add_unchecked(String::from("b"));
        list.clear();
        assert!(list.is_empty());
    }
}
