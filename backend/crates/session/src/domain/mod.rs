//! Domain Layer
//!
//! Contains entities, value objects, and the capability traits the
//! session service is built on.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    audit_event::AuditEvent,
    session::{ClientMetadata, Session, SessionView},
    user::User,
};
pub use repository::{AuditSink, SessionStore, TokenIndex, UserDirectory};
pub use value_object::token_claims::{TokenClaims, TokenKind};
