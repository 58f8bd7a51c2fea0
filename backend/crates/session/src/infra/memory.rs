//! In-Memory Implementations
//!
//! Process-local stores for single-node deployments and tests. The token
//! index measures TTLs on the tokio clock, so paused-time tests can expire
//! entries with `tokio::time::advance`.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use kernel::id::{SessionId, TokenId, UserId};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::entity::{audit_event::AuditEvent, session::Session, user::User};
use crate::domain::repository::{AuditSink, SessionStore, TokenIndex, UserDirectory};
use crate::error::{SessionError, SessionResult};

// ============================================================================
// Token Index
// ============================================================================

#[derive(Default)]
pub struct MemoryTokenIndex {
    entries: RwLock<HashMap<TokenId, (UserId, Instant)>>,
}

impl MemoryTokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl TokenIndex for MemoryTokenIndex {
    async fn put(&self, token_id: TokenId, user_id: UserId, ttl: Duration) -> SessionResult<()> {
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| SessionError::Internal("Token index TTL out of range".to_string()))?;
        self.entries.write().await.insert(token_id, (user_id, deadline));
        Ok(())
    }

    async fn get(&self, token_id: TokenId) -> SessionResult<Option<UserId>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&token_id)
            .filter(|(_, deadline)| *deadline > Instant::now())
            .map(|(user_id, _)| *user_id))
    }

    async fn delete(&self, token_id: TokenId) -> SessionResult<()> {
        self.entries.write().await.remove(&token_id);
        Ok(())
    }

    async fn purge_expired(&self) -> SessionResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (_, deadline)| *deadline > now);
        Ok((before - entries.len()) as u64)
    }
}

// ============================================================================
// Session Store
// ============================================================================

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<Vec<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored row
    pub async fn snapshot(&self) -> Vec<Session> {
        self.sessions.read().await.clone()
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session) -> SessionResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions
            .iter()
            .any(|s| s.refresh_token == session.refresh_token || s.id == session.id)
        {
            return Err(SessionError::Conflict);
        }
        sessions.push(session.clone());
        Ok(())
    }

    async fn get_by_refresh_token(&self, refresh_token: &str) -> SessionResult<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .find(|s| s.refresh_token == refresh_token)
            .cloned())
    }

    async fn get_by_user_id(&self, user_id: UserId) -> SessionResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn get_by_id_and_user_id(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> SessionResult<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .find(|s| s.id == session_id && s.user_id == user_id)
            .cloned())
    }

    async fn invalidate_by_refresh_token(&self, refresh_token: &str) -> SessionResult<u64> {
        Ok(self
            .invalidate_where(|s| s.refresh_token == refresh_token)
            .await)
    }

    async fn invalidate_by_session_id_and_user_id(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> SessionResult<u64> {
        Ok(self
            .invalidate_where(|s| s.id == session_id && s.user_id == user_id)
            .await)
    }

    async fn invalidate_all_by_user_id(&self, user_id: UserId) -> SessionResult<u64> {
        Ok(self
            .invalidate_where(|s| s.user_id == user_id && s.is_valid)
            .await)
    }

    async fn cleanup_expired(&self) -> SessionResult<u64> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.expires_at.is_none_or(|at| at >= now));
        Ok((before - sessions.len()) as u64)
    }
}

impl MemorySessionStore {
    async fn invalidate_where(&self, matches: impl Fn(&Session) -> bool) -> u64 {
        let mut sessions = self.sessions.write().await;
        let mut rows = 0;
        for session in sessions.iter_mut().filter(|s| matches(s)) {
            session.invalidate();
            rows += 1;
        }
        rows
    }
}

// ============================================================================
// User Directory
// ============================================================================

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn remove(&self, user_id: UserId) -> Option<User> {
        self.users.write().await.remove(&user_id)
    }
}

impl UserDirectory for MemoryUserDirectory {
    async fn get_by_id(&self, user_id: UserId) -> SessionResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

// ============================================================================
// Audit Sink
// ============================================================================

/// Keeps every recorded event; used to assert on audit trails
#[derive(Default)]
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }
}

impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: &AuditEvent) -> SessionResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::session::ClientMetadata;

    #[tokio::test(start_paused = true)]
    async fn test_token_index_ttl() {
        let index = MemoryTokenIndex::new();
        let token_id = TokenId::new();
        let user_id = UserId::new();

        index.put(token_id, user_id, Duration::from_secs(60)).await.unwrap();
        assert_eq!(index.get(token_id).await.unwrap(), Some(user_id));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(index.get(token_id).await.unwrap(), None);
        assert_eq!(index.len().await, 1);

        assert_eq!(index.purge_expired().await.unwrap(), 1);
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_token_index_rejects_unrepresentable_ttl() {
        let index = MemoryTokenIndex::new();
        let result = index
            .put(TokenId::new(), UserId::new(), Duration::from_secs(u64::MAX))
            .await;
        assert!(matches!(result, Err(SessionError::Internal(_))));
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_token_index_overwrite_and_delete() {
        let index = MemoryTokenIndex::new();
        let token_id = TokenId::new();
        let second_owner = UserId::new();

        index.put(token_id, UserId::new(), Duration::from_secs(60)).await.unwrap();
        index.put(token_id, second_owner, Duration::from_secs(60)).await.unwrap();
        assert_eq!(index.get(token_id).await.unwrap(), Some(second_owner));

        index.delete(token_id).await.unwrap();
        index.delete(token_id).await.unwrap();
        assert_eq!(index.get(token_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_store_unique_refresh_token() {
        let store = MemorySessionStore::new();
        let user_id = UserId::new();
        let first = Session::new(user_id, "r1".into(), ClientMetadata::default(), None);
        let duplicate = Session::new(user_id, "r1".into(), ClientMetadata::default(), None);

        store.create(&first).await.unwrap();
        assert!(matches!(store.create(&duplicate).await, Err(SessionError::Conflict)));
    }

    #[tokio::test]
    async fn test_session_store_ownership() {
        let store = MemorySessionStore::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let session = Session::new(owner, "r1".into(), ClientMetadata::default(), None);
        store.create(&session).await.unwrap();

        assert!(store.get_by_id_and_user_id(session.id, stranger).await.unwrap().is_none());
        assert_eq!(
            store.invalidate_by_session_id_and_user_id(session.id, stranger).await.unwrap(),
            0
        );
        assert_eq!(
            store.invalidate_by_session_id_and_user_id(session.id, owner).await.unwrap(),
            1
        );
        let stored = store.get_by_refresh_token("r1").await.unwrap().unwrap();
        assert!(!stored.is_valid);
    }

    #[tokio::test]
    async fn test_session_store_cleanup_expired() {
        let store = MemorySessionStore::new();
        let user_id = UserId::new();
        let past = Some(Utc::now() - chrono::Duration::hours(1));
        let future = Some(Utc::now() + chrono::Duration::hours(1));

        for (token, expires_at) in [("old", past), ("live", future), ("open", None)] {
            let session = Session::new(user_id, token.into(), ClientMetadata::default(), expires_at);
            store.create(&session).await.unwrap();
        }

        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert_eq!(store.get_by_user_id(user_id).await.unwrap().len(), 2);
    }
}
