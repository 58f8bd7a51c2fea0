//! Session and Token Lifecycle
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, token claims, store and collaborator traits
//! - `application/` - Session service, token codec, configuration
//! - `infra/` - PostgreSQL and in-memory implementations
//!
//! ## Security Model
//! - Access tokens are stateless: signature and expiry only
//! - Refresh tokens are usable only while the ephemeral index entry exists
//!   AND the durable session row is valid and unexpired
//! - A store timeout or error is a denial, never a pass
//! - Refresh tokens are not rotated on use; a leaked refresh token stays
//!   usable until it is invalidated or expires

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::{IssuedToken, SessionConfig, SessionService, TokenCodec, TokenPair};
pub use domain::{
    AuditEvent, AuditSink, ClientMetadata, Session, SessionStore, SessionView, TokenClaims,
    TokenIndex, TokenKind, User, UserDirectory,
};
pub use error::{SessionError, SessionResult};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};
pub use kernel::id::{SessionId, TokenId, UserId};
