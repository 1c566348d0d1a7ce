//! Misbehaving store fakes for failure-path tests.

use async_trait::async_trait;
use bytes::Bytes;
use deaddrop_storage::{MessageStore, StorageError, StorageResult};
use std::time::Duration;

/// A store in which every candidate code is already taken.
///
/// Drives the reservation loop to its attempt bound.
#[derive(Default)]
pub struct CollidingStore;

#[async_trait]
impl MessageStore for CollidingStore {
    async fn reserve_code(&self, _code: &str, _ttl: Duration) -> StorageResult<bool> {
        Ok(false)
    }

    async fn attach_cipher(
        &self,
        _code: &str,
        _payload: Bytes,
        _ttl: Duration,
    ) -> StorageResult<bool> {
        Ok(false)
    }

    async fn get_and_delete(&self, _code: &str) -> StorageResult<Option<Bytes>> {
        Ok(None)
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "colliding"
    }
}

/// A store whose backend is unreachable for every operation.
#[derive(Default)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn error() -> StorageError {
        StorageError::Unavailable("backend offline".to_string())
    }
}

#[async_trait]
impl MessageStore for UnavailableStore {
    async fn reserve_code(&self, _code: &str, _ttl: Duration) -> StorageResult<bool> {
        Err(Self::error())
    }

    async fn attach_cipher(
        &self,
        _code: &str,
        _payload: Bytes,
        _ttl: Duration,
    ) -> StorageResult<bool> {
        Err(Self::error())
    }

    async fn get_and_delete(&self, _code: &str) -> StorageResult<Option<Bytes>> {
        Err(Self::error())
    }

    async fn ping(&self) -> StorageResult<()> {
        Err(Self::error())
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}
