//! Message store trait definition.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// The atomic operations the relay requires from its persistence backend.
///
/// Each method must be atomic with respect to concurrent callers using the
/// same code: the backend, not the caller, decides which of two racing
/// transitions wins, and the loser observes a clean conflict result rather
/// than a partial state. Backends are also responsible for expiring records
/// once their TTL elapses (lazily or timer-based); the server never sweeps.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Create a placeholder record for `code` iff none exists, with the
    /// given TTL. Returns `Ok(false)` when the code is already taken;
    /// `Err` only on backend failure.
    async fn reserve_code(&self, code: &str, ttl: Duration) -> StorageResult<bool>;

    /// Attach `payload` to a reserved code, transitioning the record from
    /// placeholder to attached and resetting its TTL to `ttl` (measured
    /// from now, not from reservation). Returns `Ok(false)` without
    /// mutating anything when the code is unknown, expired, or already
    /// holds a payload.
    async fn attach_cipher(&self, code: &str, payload: Bytes, ttl: Duration)
    -> StorageResult<bool>;

    /// Atomically read and delete the attached payload for `code`.
    ///
    /// Returns `Ok(None)` when the code is absent, expired, or still a
    /// placeholder. When callers race, at most one observes `Some`.
    async fn get_and_delete(&self, code: &str) -> StorageResult<Option<Bytes>>;

    /// Verify backend connectivity. Side-effect free.
    async fn ping(&self) -> StorageResult<()>;

    /// Static identifier for the backend type, used in logs.
    fn backend_name(&self) -> &'static str;
}
