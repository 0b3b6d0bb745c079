//! Non-cryptographic 32-bit hash used to key cache entries and to derive
//! Bloom filter taps.
//!
//! The algorithm folds the input four bytes at a time with a
//! multiply-shift-xor step, then folds in the 0-3 trailing bytes with a
//! slightly different final mix. Every arithmetic operation wraps on
//! overflow by design: the exact bit pattern produced for a given
//! `(data, seed)` pair is part of the contract, not an implementation
//! detail, because cache keys and filter bit positions must agree across
//! builds and platforms.

const MUL: u32 = 0xc6a4a793;
const TAIL_SHIFT: u32 = 24;

/// Hashes `data` with the given `seed`.
///
/// Callers hashing cache keys conventionally pass a seed of `0`. The Bloom
/// filter uses the fixed seed `0xbc9f1d34` for every key it hashes (see
/// [`crate::bloom`]).
pub fn hash(data: &[u8], seed: u32) -> u32 {
    let mut h = seed ^ (data.len() as u32).wrapping_mul(MUL);

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let w = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h = h.wrapping_add(w);
        h = h.wrapping_mul(MUL);
        h ^= h >> 16;
    }

    let rest = chunks.remainder();
    if !rest.is_empty() {
        if rest.len() == 3 {
            h = h.wrapping_add((rest[2] as u32) << 16);
        }
        if rest.len() >= 2 {
            h = h.wrapping_add((rest[1] as u32) << 8);
        }
        h = h.wrapping_add(rest[0] as u32);
        h = h.wrapping_mul(MUL);
        h ^= h >> TAIL_SHIFT;
    }

    h
}
