//! Deterministic assignment of a user (or IP) to an A/B test bucket per video.

pub use mastermind::N_ABTEST_BUCKETS;
use std::fmt;

/// Upper bound on the hashed `key || video_id` buffer.
pub const HASH_BUFFER_LEN: usize = 256;

/// Bucket id as carried in cookies and directive lookups: lowercase hex,
/// no padding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BucketId(String);

impl BucketId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BucketId {
    fn from(value: &str) -> Self {
        BucketId(value.to_string())
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// sdbm string hash.
pub fn sdbm_hash(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |hash, &c| {
        u64::from(c)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash)
    })
}

/// Hashes `key || video_id` into one of `N_ABTEST_BUCKETS` buckets.
///
/// The concatenation is capped at `HASH_BUFFER_LEN` bytes; a video id that
/// does not fit is truncated.
pub fn assign(key: &[u8], video_id: &str) -> BucketId {
    let key = &key[..key.len().min(HASH_BUFFER_LEN)];
    let room = HASH_BUFFER_LEN - key.len();
    let video = video_id.as_bytes();
    let video = &video[..video.len().min(room)];

    let mut buf = Vec::with_capacity(key.len() + video.len());
    buf.extend_from_slice(key);
    buf.extend_from_slice(video);

    let bucket = sdbm_hash(&buf) % u64::from(N_ABTEST_BUCKETS);
    BucketId(format!("{bucket:x}"))
}
