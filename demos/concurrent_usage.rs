//! Concurrent Cache Usage Examples
//!
//! This example demonstrates multi-threaded usage patterns for pinlru's
//! `Cache`.
//!
//! Run with: cargo run --example concurrent_usage

use pinlru::{new_lru_cache, Cache, CacheConfig, CacheMetrics};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("Concurrent Cache Usage Examples");
    println!("================================\n");

    basic_concurrent_usage();
    println!();

    pinned_handles_across_threads();
    println!();

    shard_tuning();
    println!();

    throughput_comparison();
}

/// Basic multi-threaded cache usage. `Cache::clone` is a cheap `Arc` bump,
/// so every thread just gets its own handle onto the same shards.
fn basic_concurrent_usage() {
    println!("1. Basic Concurrent Usage");
    println!("   -----------------------");

    let cache: Cache<String> = new_lru_cache(1000);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("thread-{t}-key-{i}");
                    cache.release(cache.insert(key.as_bytes(), format!("value-{i}"), 1, None));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    println!("   Total charge resident: {}", cache.total_charge());
}

/// A handle returned by `insert`/`lookup` pins its entry against eviction
/// on every thread that holds it, not only the thread that obtained it.
fn pinned_handles_across_threads() {
    println!("2. Pinned Handles Cross Threads");
    println!("   ----------------------------");

    let cache: Cache<&'static str> = new_lru_cache(10);
    let pinned = cache.insert(b"hot", "never evicted while pinned", 1, None);
    let pinned = Arc::new(pinned);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let pinned = Arc::clone(&pinned);
            thread::spawn(move || {
                for i in 0..50 {
                    let key = i.to_le_bytes();
                    cache.release(cache.insert(&key, "filler", 1, None));
                }
                assert_eq!(*pinned.value(), "never evicted while pinned");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    println!("   \"hot\" survived eviction pressure from 4 threads while pinned");
}

/// More shards reduce lock contention at the cost of imprecise global LRU
/// ordering; tune the shard count to the expected thread count.
fn shard_tuning() {
    println!("3. Shard Count Tuning");
    println!("   -------------------");

    for shards in [1usize, 4, 16] {
        let cache: Cache<u32> = Cache::new(CacheConfig::with_capacity_and_shards(
            10_000,
            std::num::NonZeroUsize::new(shards).unwrap(),
        ));
        println!("   {shards} shard(s) -> {} total shards reported", cache.shard_count());
    }
}

/// Rough single-shard vs multi-shard throughput comparison under
/// concurrent load.
fn throughput_comparison() {
    println!("4. Throughput Comparison");
    println!("   ----------------------");

    for shards in [1usize, 8] {
        let cache: Cache<u32> = Cache::new(CacheConfig::with_capacity_and_shards(
            10_000,
            std::num::NonZeroUsize::new(shards).unwrap(),
        ));

        let start = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..5000u32 {
                        let key = (t * 10_000 + i).to_le_bytes();
                        cache.release(cache.insert(&key, i, 1, None));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let elapsed = start.elapsed();
        let metrics = cache.metrics();
        println!(
            "   {shards} shard(s): {:?}, {} insertions recorded",
            elapsed, metrics["insertions"]
        );
    }
}
