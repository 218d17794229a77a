//! Key-value store adapters.
//!
//! The captcha lifecycle and the rate limiter only need a narrow expiring
//! key-value contract; [`ExpiringStore`] is that seam. [`RedisStore`] is the
//! production implementation, [`MemoryStore`] backs tests and development
//! without a Redis instance.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use palisade_common::AdminError;

/// Expiring key-value store contract.
///
/// Every operation has atomic single-key semantics. `fetch_and_delete` in
/// particular must guarantee that concurrent callers for one key observe
/// the value at most once.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Store `value` under `key`, auto-evicted after `ttl_secs`.
    async fn set_with_expiry(&self, key: &str, ttl_secs: u64, value: &str)
    -> Result<(), AdminError>;

    /// Read the live value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, AdminError>;

    /// Atomically read and remove the value under `key`.
    async fn fetch_and_delete(&self, key: &str) -> Result<Option<String>, AdminError>;

    /// Remove `key`; true if a live value was removed.
    async fn delete(&self, key: &str) -> Result<bool, AdminError>;

    /// Increment the counter under `key`, setting `ttl_secs` expiry when
    /// the counter is first created. Returns the post-increment value.
    async fn incr_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<u64, AdminError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), AdminError>;
}
