//! Application state shared across handlers.

use crate::ratelimit::RateLimitState;
use deaddrop_core::config::AppConfig;
use deaddrop_storage::MessageStore;
use std::sync::Arc;

/// Shared application state.
///
/// The only in-process mutable resource is the rate limiter's token pool;
/// every protocol-significant transition lives in the store.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Message store backend.
    pub store: Arc<dyn MessageStore>,
    /// Admission control state.
    pub rate_limit: RateLimitState,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Validates the configuration and logs warnings for legal but
    /// suspicious settings.
    ///
    /// # Panics
    ///
    /// Panics if configuration validation fails with an error.
    pub fn new(config: AppConfig, store: Arc<dyn MessageStore>) -> Self {
        match config.validate() {
            Ok(warnings) => {
                for warning in warnings {
                    tracing::warn!("configuration warning: {warning}");
                }
            }
            Err(error) => {
                panic!("invalid configuration: {error}");
            }
        }

        let rate_limit = RateLimitState::new(&config.rate_limit);

        Self {
            config: Arc::new(config),
            store,
            rate_limit,
        }
    }
}
