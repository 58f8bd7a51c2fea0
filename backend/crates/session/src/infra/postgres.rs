//! PostgreSQL Repository Implementations

use std::time::Duration;

use chrono::{DateTime, Utc};
use kernel::id::{SessionId, TokenId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{SessionStore, TokenIndex, UserDirectory};
use crate::error::{SessionError, SessionResult};

// ============================================================================
// Session Store
// ============================================================================

/// PostgreSQL-backed durable session store (`sessions` table)
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PgSessionStore {
    async fn create(&self, session: &Session) -> SessionResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id,
                user_id,
                refresh_token,
                user_agent,
                ip_address,
                is_valid,
                created_at,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(&session.refresh_token)
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.is_valid)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => SessionError::Conflict,
            other => SessionError::Database(other),
        })?;

        Ok(())
    }

    async fn get_by_refresh_token(&self, refresh_token: &str) -> SessionResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, refresh_token, user_agent, ip_address,
                   is_valid, created_at, expires_at
            FROM sessions
            WHERE refresh_token = $1
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn get_by_user_id(&self, user_id: UserId) -> SessionResult<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, refresh_token, user_agent, ip_address,
                   is_valid, created_at, expires_at
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SessionRow::into_session).collect())
    }

    async fn get_by_id_and_user_id(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> SessionResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, refresh_token, user_agent, ip_address,
                   is_valid, created_at, expires_at
            FROM sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn invalidate_by_refresh_token(&self, refresh_token: &str) -> SessionResult<u64> {
        let rows = sqlx::query("UPDATE sessions SET is_valid = FALSE WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows)
    }

    async fn invalidate_by_session_id_and_user_id(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> SessionResult<u64> {
        let rows =
            sqlx::query("UPDATE sessions SET is_valid = FALSE WHERE id = $1 AND user_id = $2")
                .bind(session_id.as_uuid())
                .bind(user_id.as_uuid())
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows)
    }

    async fn invalidate_all_by_user_id(&self, user_id: UserId) -> SessionResult<u64> {
        let rows = sqlx::query(
            "UPDATE sessions SET is_valid = FALSE WHERE user_id = $1 AND is_valid = TRUE",
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }

    async fn cleanup_expired(&self) -> SessionResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Token Index
// ============================================================================

/// Refresh-token index on an UNLOGGED table
///
/// Rows past `expires_at` are invisible to `get`; `purge_expired` reclaims
/// them. Contents do not survive a crash, which only logs users out.
#[derive(Clone)]
pub struct PgTokenIndex {
    pool: PgPool,
}

impl PgTokenIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TokenIndex for PgTokenIndex {
    async fn put(&self, token_id: TokenId, user_id: UserId, ttl: Duration) -> SessionResult<()> {
        let expires_at = deadline(ttl)?;

        sqlx::query(
            r#"
            INSERT INTO refresh_token_index (token_id, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (token_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, token_id: TokenId) -> SessionResult<Option<UserId>> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM refresh_token_index WHERE token_id = $1 AND expires_at > $2",
        )
        .bind(token_id.as_uuid())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner.map(UserId::from))
    }

    async fn delete(&self, token_id: TokenId) -> SessionResult<()> {
        sqlx::query("DELETE FROM refresh_token_index WHERE token_id = $1")
            .bind(token_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge_expired(&self) -> SessionResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_token_index WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(entries_deleted = deleted, "Purged expired refresh token index entries");

        Ok(deleted)
    }
}

fn deadline(ttl: Duration) -> SessionResult<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| SessionError::Internal("Token index TTL out of range".to_string()))
}

// ============================================================================
// User Directory
// ============================================================================

/// Read-only view of the `users` table
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for PgUserDirectory {
    async fn get_by_id(&self, user_id: UserId) -> SessionResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, full_name FROM users WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    refresh_token: String,
    user_agent: Option<String>,
    ip_address: Option<String>,
    is_valid: bool,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            id: SessionId::from(self.id),
            user_id: UserId::from(self.user_id),
            refresh_token: self.refresh_token,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            is_valid: self.is_valid,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User::new(UserId::from(self.id), self.email, self.full_name)
    }
}
