//! Cache Metrics Demonstration
//!
//! Demonstrates the `CacheMetrics` system: per-shard counters aggregated
//! into one deterministically-ordered report, and how hit rate, eviction
//! count, and charge accounting respond to a small-capacity workload.

use pinlru::{Cache, CacheConfig, CacheMetrics};
use std::num::NonZeroUsize;

fn main() {
    println!("Cache Metrics Demonstration");
    println!("============================\n");

    // A small, single-shard cache forces evictions quickly, so metrics
    // show interesting movement within a handful of operations.
    let cache: Cache<i32> = Cache::new(CacheConfig::with_capacity_and_shards(
        3,
        NonZeroUsize::new(1).unwrap(),
    ));

    println!("Inserting 5 items into a capacity-3 cache...");
    cache.release(cache.insert(b"apple", 1, 1, None));
    cache.release(cache.insert(b"banana", 2, 1, None));
    cache.release(cache.insert(b"cherry", 3, 1, None));
    cache.release(cache.insert(b"date", 4, 1, None));
    cache.release(cache.insert(b"elderberry", 5, 1, None));

    println!("Re-accessing \"date\" and \"elderberry\" (hits), \"apple\" (miss, evicted)...");
    let _ = cache.lookup(b"date");
    let _ = cache.lookup(b"elderberry");
    let _ = cache.lookup(b"apple");

    display_metrics(&cache);

    demonstrate_deterministic_ordering(&cache);
}

fn display_metrics(cache: &Cache<i32>) {
    println!("\nMetrics:");
    for (key, value) in cache.metrics() {
        println!("  {key:>16}: {value}");
    }
}

/// `metrics()` returns a `BTreeMap`, so its key order is always
/// alphabetical regardless of insertion order — useful for snapshot
/// comparisons in tests and for stable log output.
fn demonstrate_deterministic_ordering(cache: &Cache<i32>) {
    let keys: Vec<String> = cache.metrics().into_keys().collect();
    println!("\nMetrics keys in deterministic order: {keys:?}");
}
