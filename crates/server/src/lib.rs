//! HTTP surface for the deaddrop one-time message relay.
//!
//! This crate provides:
//! - Code reservation (`POST /code`)
//! - Payload attachment (`PUT /message/{code}`)
//! - One-time retrieval (`GET /message/{code}`)
//! - Token-bucket admission control
//! - Defensive headers and CORS on every response

pub mod error;
pub mod handlers;
pub mod ratelimit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use ratelimit::RateLimitState;
pub use routes::create_router;
pub use state::AppState;
