//! Cache and Bloom filter configuration.
//!
//! One plain struct per concern: builder methods that return `Self`, no
//! external builder crate, sizing guidance in doc comments rather than a
//! separate design document.
//!
//! # Sizing Guidelines
//!
//! `capacity` is a *charge* budget, not an entry count. If every entry's
//! charge is `1`, capacity behaves like a maximum entry count; if charge
//! tracks byte size, capacity behaves like a maximum resident byte budget.
//! A capacity of `0` is legal: the cache admits nothing persistently and
//! every insert is its own immediate eviction.
//!
//! `shards` splits that budget roughly evenly across that many independent
//! [`crate::shard::LruShard`]s, trading strict global LRU ordering for
//! reduced lock contention under concurrent access.

use core::fmt;
use std::num::NonZeroUsize;

/// Returns a reasonable default shard count based on available parallelism,
/// clamped to a small power-of-two range.
fn default_shard_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
        .clamp(1, 16)
        .next_power_of_two()
}

/// Configuration for a [`crate::cache::Cache`].
///
/// # Required Parameters
///
/// - `capacity`: total charge budget across all shards (set in the
///   constructor).
///
/// # Optional Parameters (Builder Methods)
///
/// - `shards`: number of independently-locked partitions (default: based on
///   CPU count, see [`default_shard_count`]).
///
/// # Examples
///
/// ```
/// use pinlru::config::CacheConfig;
///
/// let config = CacheConfig::new(10_000).with_shards(16);
/// ```
#[derive(Clone, Copy)]
pub struct CacheConfig {
    capacity: u64,
    shards: NonZeroUsize,
}

impl CacheConfig {
    /// Creates a configuration with the default shard count for this
    /// machine. `capacity` may be `0`; the cache then admits nothing
    /// persistently and every insert is its own immediate eviction.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let shards = default_shard_count().min(capacity.min(usize::MAX as u64) as usize);
        Self {
            capacity,
            shards: NonZeroUsize::new(shards.max(1)).expect("clamped to at least 1"),
        }
    }

    /// Creates a configuration with an explicit shard count. `capacity`
    /// may be `0`.
    #[must_use]
    pub fn with_capacity_and_shards(capacity: u64, shards: NonZeroUsize) -> Self {
        Self { capacity, shards }
    }

    /// Sets the number of independently-locked shards.
    ///
    /// More shards reduce contention under concurrent access at the cost of
    /// a less precise global LRU ordering: eviction order is only exact
    /// within a shard.
    ///
    /// # Panics
    ///
    /// Panics if `shards` is `0`.
    #[must_use]
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = NonZeroUsize::new(shards).expect("shards must be > 0");
        self
    }

    /// Total charge budget across all shards.
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of independently-locked shards.
    #[inline]
    pub fn shards(&self) -> NonZeroUsize {
        self.shards
    }

    /// The per-shard charge budget: `capacity` divided evenly across
    /// `shards`, rounded up. `0` when `capacity` is `0` — legal, and
    /// handled by [`crate::shard::LruShard`] as an immediate-eviction
    /// budget rather than a division fault.
    pub(crate) fn shard_capacity(&self) -> u64 {
        let shards = self.shards.get() as u64;
        self.capacity.div_ceil(shards)
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("capacity", &self.capacity)
            .field("shards", &self.shards)
            .finish()
    }
}

/// Configuration for a [`crate::bloom::BloomFilterPolicy`].
#[derive(Clone, Copy)]
pub struct BloomFilterPolicyConfig {
    bits_per_key: u32,
}

impl BloomFilterPolicyConfig {
    /// Creates a configuration targeting `bits_per_key` bits of filter per
    /// added key. 10 bits per key is the LevelDB-standard default, yielding
    /// roughly a 1% false-positive rate.
    #[must_use]
    pub fn new(bits_per_key: u32) -> Self {
        Self { bits_per_key }
    }

    /// Bits of filter allocated per key.
    #[inline]
    pub fn bits_per_key(&self) -> u32 {
        self.bits_per_key
    }
}

impl Default for BloomFilterPolicyConfig {
    /// The LevelDB-standard default of 10 bits per key.
    fn default() -> Self {
        Self { bits_per_key: 10 }
    }
}

impl fmt::Debug for BloomFilterPolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilterPolicyConfig")
            .field("bits_per_key", &self.bits_per_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shard_count_is_a_power_of_two_within_bounds() {
        let n = default_shard_count();
        assert!((1..=16).contains(&n));
        assert_eq!(n & (n - 1), 0);
    }

    #[test]
    fn shard_capacity_rounds_up() {
        let config = CacheConfig::with_capacity_and_shards(10, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.shard_capacity(), 3);
    }

    #[test]
    fn shard_capacity_is_at_least_one_when_shards_outnumber_capacity() {
        let config = CacheConfig::with_capacity_and_shards(1, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.shard_capacity(), 1);
    }

    #[test]
    fn zero_capacity_yields_zero_shard_capacity() {
        let config = CacheConfig::with_capacity_and_shards(0, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.shard_capacity(), 0);
    }

    #[test]
    fn with_shards_overrides_default() {
        let config = CacheConfig::new(1000).with_shards(8);
        assert_eq!(config.shards().get(), 8);
    }

    #[test]
    fn bloom_config_defaults_to_ten_bits_per_key() {
        assert_eq!(BloomFilterPolicyConfig::default().bits_per_key(), 10);
    }
}
