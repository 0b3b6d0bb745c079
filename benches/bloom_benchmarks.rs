use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pinlru::BloomFilterPolicy;

fn benchmark_create_filter(c: &mut Criterion) {
    let policy = BloomFilterPolicy::new(10);
    let mut group = c.benchmark_group("Bloom CreateFilter");

    for &n in &[100usize, 1_000, 10_000] {
        let keys: Vec<[u8; 4]> = (0..n as u32).map(u32::to_le_bytes).collect();
        let key_refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
        group.bench_function(format!("{n} keys"), |b| {
            b.iter(|| black_box(policy.create_filter(&key_refs)));
        });
    }

    group.finish();
}

fn benchmark_key_may_match(c: &mut Criterion) {
    let policy = BloomFilterPolicy::new(10);
    let keys: Vec<[u8; 4]> = (0..10_000u32).map(u32::to_le_bytes).collect();
    let key_refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
    let filter = policy.create_filter(&key_refs);

    c.bench_function("Bloom KeyMayMatch, 10,000-key filter", |b| {
        b.iter(|| {
            for k in &key_refs {
                black_box(policy.key_may_match(k, &filter));
            }
        });
    });
}

criterion_group!(benches, benchmark_create_filter, benchmark_key_may_match);
criterion_main!(benches);
