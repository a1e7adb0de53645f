//! Jump consistent hash.
//!
//! Lamping & Veach, "A Fast, Minimal Memory, Consistent Hash Algorithm"
//! (<https://arxiv.org/abs/1406.2294>). Maps a 64-bit key onto `0..num_buckets`
//! with no per-bucket state. Unlike the ring, buckets are numbered: the set
//! can only grow or shrink at the end, so it suits shards that are always
//! online rather than named nodes that come and go.

/// Returns the bucket in `0..num_buckets` for `key`, or `None` when there are
/// no buckets.
///
/// Growing from `n` to `n + 1` buckets moves a key only into bucket `n`.
pub fn jump_hash(mut key: u64, num_buckets: u32) -> Option<u32> {
    if num_buckets == 0 {
        return None;
    }

    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < i64::from(num_buckets) {
        b = j;
        key = key.wrapping_mul(2_862_933_555_777_941_757).wrapping_add(1);
        j = ((b + 1) as f64 * ((1u64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }
    Some(b as u32)
}
