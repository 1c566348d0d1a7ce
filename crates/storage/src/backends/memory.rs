//! In-memory message store.
//!
//! All transitions happen under a single mutex, which is what makes the
//! reserve/attach/take primitives atomic. Expiry is lazy: an entry past its
//! deadline is dropped the next time its code is touched, and nothing
//! sweeps the map in the background. Deadlines use [`tokio::time::Instant`]
//! so tests can drive expiry with a paused clock.

use crate::error::StorageResult;
use crate::traits::MessageStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// The two shapes a record takes over its lifetime.
enum Record {
    Placeholder,
    Attached(Bytes),
}

struct Entry {
    record: Record,
    expires_at: Instant,
}

/// In-process message store for tests and single-node development.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("memory store mutex was poisoned, recovering with into_inner()");
            poisoned.into_inner()
        })
    }

    /// Drop the entry for `code` iff its deadline has passed.
    fn prune_expired(entries: &mut HashMap<String, Entry>, code: &str, now: Instant) {
        let expired = matches!(entries.get(code), Some(entry) if entry.expires_at <= now);
        if expired {
            entries.remove(code);
        }
    }

    /// Number of live entries. Intended for tests.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn reserve_code(&self, code: &str, ttl: Duration) -> StorageResult<bool> {
        let now = Instant::now();
        let mut entries = self.lock();
        Self::prune_expired(&mut entries, code, now);

        if entries.contains_key(code) {
            return Ok(false);
        }
        entries.insert(
            code.to_string(),
            Entry {
                record: Record::Placeholder,
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn attach_cipher(
        &self,
        code: &str,
        payload: Bytes,
        ttl: Duration,
    ) -> StorageResult<bool> {
        let now = Instant::now();
        let mut entries = self.lock();
        Self::prune_expired(&mut entries, code, now);

        match entries.get_mut(code) {
            Some(entry) => match entry.record {
                Record::Placeholder => {
                    entry.record = Record::Attached(payload);
                    entry.expires_at = now + ttl;
                    Ok(true)
                }
                Record::Attached(_) => Ok(false),
            },
            None => Ok(false),
        }
    }

    async fn get_and_delete(&self, code: &str) -> StorageResult<Option<Bytes>> {
        let now = Instant::now();
        let mut entries = self.lock();
        Self::prune_expired(&mut entries, code, now);

        let attached = matches!(
            entries.get(code),
            Some(entry) if matches!(entry.record, Record::Attached(_))
        );
        if !attached {
            return Ok(None);
        }
        match entries.remove(code) {
            Some(Entry {
                record: Record::Attached(payload),
                ..
            }) => Ok(Some(payload)),
            _ => Ok(None),
        }
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
