//! Bloom filter policy tests, ported from the original `BloomTest` fixture
//! (`base/bloom_filter_test.cc`): build a filter over a batch of keys, then
//! probe it for membership.

use pinlru::BloomFilterPolicy;

fn key(i: u32) -> [u8; 4] {
    i.to_le_bytes()
}

#[test]
fn empty_filter() {
    let policy = BloomFilterPolicy::new(10);
    let filter = policy.create_filter(&[]);
    assert!(!policy.key_may_match(b"hello", &filter));
    assert!(!policy.key_may_match(b"world", &filter));
}

#[test]
fn small_filter() {
    let policy = BloomFilterPolicy::new(10);
    let filter = policy.create_filter(&[b"hello", b"world"]);
    assert!(policy.key_may_match(b"hello", &filter));
    assert!(policy.key_may_match(b"world", &filter));
    assert!(!policy.key_may_match(b"x", &filter));
    assert!(!policy.key_may_match(b"foo", &filter));
}

#[test]
fn no_false_negatives_across_varying_set_sizes() {
    let policy = BloomFilterPolicy::new(10);
    let mut length = 1u32;
    while length < 10_000 {
        let keys: Vec<[u8; 4]> = (0..length).map(key).collect();
        let key_refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
        let filter = policy.create_filter(&key_refs);
        for k in &key_refs {
            assert!(
                policy.key_may_match(k, &filter),
                "false negative at length {length}"
            );
        }
        length = if length < 10 { length + 1 } else { length * 10 };
    }
}

#[test]
fn false_positive_rate_stays_bounded() {
    // FP rate over 10,000 disjoint probes stays <= 2% for every N, and
    // <= 1.25% for at least 5/6 of N.
    let policy = BloomFilterPolicy::new(10);
    let mut lengths = Vec::new();
    let mut n = 1u32;
    while n <= 10_000 {
        lengths.push(n);
        n = if n < 10 { n + 1 } else { n * 10 };
    }

    let mut mediocre = 0;
    let mut good = 0;
    for length in lengths {
        let keys: Vec<[u8; 4]> = (0..length).map(key).collect();
        let key_refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
        let filter = policy.create_filter(&key_refs);

        let mut false_positives = 0u32;
        for probe in 0..10_000u32 {
            let probe_key = key(probe + 1_000_000_000);
            if policy.key_may_match(&probe_key, &filter) {
                false_positives += 1;
            }
        }
        let rate = f64::from(false_positives) / 10_000.0;
        assert!(rate <= 0.02, "length {length} false-positive rate {rate}");
        if rate > 0.0125 {
            mediocre += 1;
        } else {
            good += 1;
        }
    }
    assert!(mediocre <= good / 5, "too many mediocre false-positive rates");
}
