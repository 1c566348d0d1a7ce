//! Message storage abstraction and backends for deaddrop.
//!
//! This crate provides:
//! - The [`MessageStore`] contract: the four atomic operations the relay
//!   needs from its persistence collaborator
//! - Backends: in-process memory (tests, development) and Redis (production)
//!
//! The protocol layer takes no locks of its own; every lifecycle invariant
//! rests on these operations being atomic per code.

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{memory::MemoryStore, redis::RedisStore};
pub use error::{StorageError, StorageResult};
pub use traits::MessageStore;

use deaddrop_core::config::StorageConfig;
use std::sync::Arc;

/// Create a message store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn MessageStore>> {
    match config {
        StorageConfig::Memory => {
            tracing::warn!("using in-memory storage; messages do not survive restarts");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageConfig::Redis { url } => {
            let backend = RedisStore::connect(url).await?;
            Ok(Arc::new(backend))
        }
    }
}
