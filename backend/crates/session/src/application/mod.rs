//! Application Layer
//!
//! Session service, its configuration and the token codec.

pub mod config;
pub mod create_session;
pub mod invalidate_session;
pub mod list_sessions;
pub mod refresh_session;
pub mod service;
pub mod token_codec;
pub mod validate_access;

// Re-exports
pub use config::SessionConfig;
pub use service::{SessionService, TokenPair};
pub use token_codec::{IssuedToken, TokenCodec};
