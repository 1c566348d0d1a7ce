//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
    /// Per-request deadline in seconds, covering body read and response write.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
    /// TTL for a reserved-but-empty code in seconds.
    #[serde(default = "default_placeholder_ttl_secs")]
    pub placeholder_ttl_secs: u64,
    /// TTL for an attached message in seconds, measured from attachment.
    #[serde(default = "default_message_ttl_secs")]
    pub message_ttl_secs: u64,
    /// Access code length in characters.
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_bytes() -> u64 {
    crate::DEFAULT_MAX_BODY_BYTES
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

fn default_placeholder_ttl_secs() -> u64 {
    600 // 10 minutes to attach a payload
}

fn default_message_ttl_secs() -> u64 {
    86400 // 24 hours to pick a message up
}

fn default_code_length() -> usize {
    crate::DEFAULT_CODE_LENGTH
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            placeholder_ttl_secs: default_placeholder_ttl_secs(),
            message_ttl_secs: default_message_ttl_secs(),
            code_length: default_code_length(),
        }
    }
}

impl ServerConfig {
    /// Get the placeholder TTL as a Duration.
    pub fn placeholder_ttl(&self) -> Duration {
        Duration::from_secs(self.placeholder_ttl_secs)
    }

    /// Get the message TTL as a Duration.
    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }

    /// Get the per-request deadline as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the shutdown grace period as a Duration.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-process memory store. Records do not survive restarts.
    Memory,
    /// Redis-backed store.
    Redis {
        /// Connection URL (e.g., "redis://127.0.0.1:6379").
        url: String,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Memory
    }
}

/// Admission control configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained token refill rate. Zero disables rate limiting entirely.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    /// Bucket capacity: how many requests may arrive back to back.
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

/// CORS configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser. A single "*" entry
    /// allows any origin. Empty disables CORS handling.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Whether the allow-list is the wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.allowed_origins.len() == 1 && self.allowed_origins[0] == "*"
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl AppConfig {
    /// Validate configuration invariants.
    ///
    /// Returns warnings for settings that are legal but probably unintended,
    /// or an error message for settings the server cannot run with.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        if self.server.code_length == 0 {
            return Err("server.code_length must be at least 1".to_string());
        }
        if self.server.max_body_bytes == 0 {
            return Err("server.max_body_bytes must be at least 1".to_string());
        }
        if self.server.placeholder_ttl_secs == 0 {
            return Err("server.placeholder_ttl_secs must be at least 1".to_string());
        }
        if self.server.message_ttl_secs == 0 {
            return Err("server.message_ttl_secs must be at least 1".to_string());
        }

        let mut warnings = Vec::new();
        if self.server.code_length < 6 {
            warnings.push(format!(
                "server.code_length = {} makes codes guessable; 8 or more is recommended",
                self.server.code_length
            ));
        }
        if self.rate_limit.requests_per_second == 0 {
            warnings.push("rate limiting is disabled (requests_per_second = 0)".to_string());
        } else if self.rate_limit.burst == 0 {
            warnings.push("rate_limit.burst = 0 is clamped to 1".to_string());
        }
        if self.cors.is_wildcard() {
            warnings.push("cors.allowed_origins = [\"*\"] allows any origin".to_string());
        }
        Ok(warnings)
    }

    /// Create a test configuration: memory storage, no rate limiting, no CORS.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            rate_limit: RateLimitConfig {
                requests_per_second: 0,
                burst: 0,
            },
            ..Default::default()
        }
    }
}
