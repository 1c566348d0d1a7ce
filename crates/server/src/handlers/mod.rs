//! HTTP request handlers.

pub mod codes;
pub mod health;
pub mod messages;

pub use codes::*;
pub use health::*;
pub use messages::*;
