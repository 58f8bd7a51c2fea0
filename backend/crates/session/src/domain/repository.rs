//! Capability Traits
//!
//! Interfaces for the two session stores and the external collaborators.
//! Implementations live in the infrastructure layer; the service receives
//! them through its constructor.

use std::time::Duration;

use kernel::id::{SessionId, TokenId, UserId};

use crate::domain::entity::{audit_event::AuditEvent, session::Session, user::User};
use crate::error::SessionResult;

/// Ephemeral refresh-token index (token id -> owner, with TTL)
///
/// Presence of an entry is required for a refresh token to be usable.
#[trait_variant::make(TokenIndex: Send)]
pub trait LocalTokenIndex {
    /// Store mapping for `ttl`; overwrites an existing entry
    async fn put(&self, token_id: TokenId, user_id: UserId, ttl: Duration) -> SessionResult<()>;

    /// Owner of a live entry. Absent and expired are indistinguishable.
    async fn get(&self, token_id: TokenId) -> SessionResult<Option<UserId>>;

    /// Remove an entry; no error if absent
    async fn delete(&self, token_id: TokenId) -> SessionResult<()>;

    /// Drop entries past their TTL (for backends without native eviction)
    async fn purge_expired(&self) -> SessionResult<u64>;
}

/// Durable session store
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Insert a new session; `Conflict` on refresh token collision
    async fn create(&self, session: &Session) -> SessionResult<()>;

    async fn get_by_refresh_token(&self, refresh_token: &str) -> SessionResult<Option<Session>>;

    /// All sessions of a user regardless of validity or expiry, newest first
    async fn get_by_user_id(&self, user_id: UserId) -> SessionResult<Vec<Session>>;

    /// `None` when the session belongs to another user
    async fn get_by_id_and_user_id(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> SessionResult<Option<Session>>;

    async fn invalidate_by_refresh_token(&self, refresh_token: &str) -> SessionResult<u64>;

    /// No-op unless both id and owner match
    async fn invalidate_by_session_id_and_user_id(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> SessionResult<u64>;

    async fn invalidate_all_by_user_id(&self, user_id: UserId) -> SessionResult<u64>;

    /// Delete rows whose `expires_at` has passed
    async fn cleanup_expired(&self) -> SessionResult<u64>;
}

/// Source of current user data, consulted on refresh
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    async fn get_by_id(&self, user_id: UserId) -> SessionResult<Option<User>>;
}

/// Destination for audit records
#[trait_variant::make(AuditSink: Send)]
pub trait LocalAuditSink {
    async fn record(&self, event: &AuditEvent) -> SessionResult<()>;
}
