#![doc = include_str!("../README.md")]
//!
//! ## Modules
//!
//! - [`cache`]: The sharded, concurrent `Cache` facade
//! - [`bloom`]: Bloom filter builder and matcher
//! - [`config`]: Configuration structures for `Cache` and `BloomFilterPolicy`
//! - [`metrics`]: Metrics collection for cache performance monitoring
//! - [`hash`]: The non-cryptographic hash shared by the cache and the filter

/// The non-cryptographic 32-bit hash shared by the cache's key lookups and
/// the Bloom filter's hash taps.
pub mod hash;

/// Bloom filter builder and matcher.
///
/// Encodes a set of keys into a compact byte array and answers
/// probabilistic membership queries against it, with no false negatives
/// and a bounded false-positive rate.
pub mod bloom;

/// The resident payload of one cache slot.
pub(crate) mod entry;

/// Doubly linked list with O(1) cross-list transfer between the LRU and
/// in-use lists.
///
/// **Note**: internal infrastructure exposing unsafe raw pointer
/// operations. Use [`Cache`] instead of this module directly.
pub(crate) mod list;

/// Chained hash table with a grow-only bucket array.
pub(crate) mod table;

/// A single-lock LRU shard: hash table, LRU/in-use lists, charge
/// accounting.
pub(crate) mod shard;

/// The sharded, concurrent `Cache` facade.
///
/// Partitions capacity across independently-locked shards so unrelated
/// keys never contend on the same mutex.
pub mod cache;

/// Configuration structures for [`Cache`] and [`bloom::BloomFilterPolicy`].
pub mod config;

/// Cache metrics system.
///
/// Provides a flexible metrics collection and reporting interface shared
/// across every shard of a [`Cache`].
pub mod metrics;

pub use bloom::BloomFilterPolicy;
pub use cache::{new_lru_cache, Cache, Handle};
pub use config::{BloomFilterPolicyConfig, CacheConfig};
pub use entry::Deleter;
pub use metrics::CacheMetrics;
