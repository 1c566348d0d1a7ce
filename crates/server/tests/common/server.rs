//! Server test utilities.

use deaddrop_core::config::AppConfig;
use deaddrop_server::{AppState, create_router};
use deaddrop_storage::{MemoryStore, MessageStore};
use std::sync::Arc;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server backed by an in-process memory store, with
    /// rate limiting and CORS disabled.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test server with custom config modifications.
    pub fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = AppConfig::for_testing();
        modifier(&mut config);
        Self::build(config, Arc::new(MemoryStore::new()))
    }

    /// Create a test server on top of a specific store, typically one of the
    /// misbehaving fakes from [`crate::common::storage`].
    pub fn with_store(store: Arc<dyn MessageStore>) -> Self {
        Self::build(AppConfig::for_testing(), store)
    }

    fn build(config: AppConfig, store: Arc<dyn MessageStore>) -> Self {
        let state = AppState::new(config, store);
        let router = create_router(state.clone());
        Self { router, state }
    }
}
