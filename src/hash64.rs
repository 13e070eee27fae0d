//! 64-bit key mixing used to pick a bucket.
//!
//! The mixer is the murmur3/splitmix finalizer. Its constants and shift
//! amounts are part of the on-disk compatibility contract: every reader of
//! the same partition file must place a key in the same bucket for a given
//! capacity, so the function must stay bit-exact.

const MIX_1: u64 = 0xff51_afd7_ed55_8ccd;
const MIX_2: u64 = 0xc4ce_b9fe_1a85_ec53;

/// Mixes the key's two's-complement bit pattern into a well-distributed hash.
#[inline]
pub fn mix64(key: i64) -> u64 {
    let mut h = key as u64;
    h ^= h >> 33;
    h = h.wrapping_mul(MIX_1);
    h ^= h >> 33;
    h = h.wrapping_mul(MIX_2);
    h ^= h >> 33;
    h
}

/// Bucket for `key` in a table of `capacity` buckets. `capacity` must be non-zero.
#[inline]
pub fn bucket_index(key: i64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (mix64(key) % capacity as u64) as usize
}
