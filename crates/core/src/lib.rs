//! Core domain types and shared logic for the deaddrop one-time message relay.
//!
//! This crate defines what the other crates agree on:
//! - Access code alphabet and generation
//! - Configuration types and defaults

pub mod code;
pub mod config;

pub use code::{CODE_ALPHABET, DEFAULT_CODE_LENGTH, generate_code};
pub use config::{AppConfig, CorsConfig, RateLimitConfig, ServerConfig, StorageConfig};

/// Default cap on message bodies: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;
