//! Invalidate Sessions
//!
//! Logout of one token, of one session by id, or of every session a user
//! has. Index deletes are best-effort; the durable update is authoritative.
//! All three are idempotent.

use kernel::id::{SessionId, UserId};

use crate::application::service::SessionService;
use crate::domain::entity::audit_event::AuditEvent;
use crate::domain::repository::{AuditSink, SessionStore, TokenIndex, UserDirectory};
use crate::domain::value_object::token_claims::TokenKind;
use crate::error::{SessionError, SessionResult};

impl<I, S, U, A> SessionService<I, S, U, A>
where
    I: TokenIndex + Sync + 'static,
    S: SessionStore + Sync + 'static,
    U: UserDirectory + Sync + 'static,
    A: AuditSink + Sync + Send + 'static,
{
    /// Logout using the refresh token itself
    pub async fn invalidate_session(&self, refresh_token: &str) -> SessionResult<()> {
        let claims = self.codec.validate(refresh_token)?;
        if !claims.is_kind(TokenKind::Refresh) {
            return Err(SessionError::WrongTokenKind);
        }

        self.forget_token(claims.token_id).await;

        let audit = AuditEvent::auth(AuditEvent::LOGOUT).user(claims.user_id);

        let result = self
            .bounded(
                "session_store.invalidate_by_refresh_token",
                self.session_store.invalidate_by_refresh_token(refresh_token),
            )
            .await;

        match result {
            Ok(rows) => {
                tracing::info!(user_id = %claims.user_id, rows, "Session invalidated");
                self.audit(audit);
                Ok(())
            }
            Err(e) => {
                let err = durable_failure("invalidate session", e);
                self.audit(audit.failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Logout everywhere; returns the number of sessions marked invalid
    pub async fn invalidate_all_sessions(&self, user_id: UserId) -> SessionResult<u64> {
        let sessions = self
            .bounded(
                "session_store.get_by_user_id",
                self.session_store.get_by_user_id(user_id),
            )
            .await;

        match sessions {
            Ok(sessions) => {
                // Invalidated rows too: an earlier index delete may have failed
                for session in &sessions {
                    match self.codec.decode_ignoring_time(&session.refresh_token) {
                        Ok(claims) => self.forget_token(claims.token_id).await,
                        Err(e) => tracing::warn!(
                            session_id = %session.id,
                            error = %e,
                            "Stored refresh token could not be decoded"
                        ),
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Could not list sessions; index entries left to expire"
                );
            }
        }

        let audit = AuditEvent::session(AuditEvent::INVALIDATE_ALL).user(user_id);

        let result = self
            .bounded(
                "session_store.invalidate_all_by_user_id",
                self.session_store.invalidate_all_by_user_id(user_id),
            )
            .await;

        match result {
            Ok(rows) => {
                tracing::info!(user_id = %user_id, rows, "All sessions invalidated");
                self.audit(audit);
                Ok(rows)
            }
            Err(e) => {
                let err = durable_failure("invalidate all sessions", e);
                self.audit(audit.failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Revoke one session by id, only if `user_id` owns it
    pub async fn invalidate_specific_session(
        &self,
        user_id: UserId,
        session_id: SessionId,
    ) -> SessionResult<()> {
        let session = self
            .bounded(
                "session_store.get_by_id_and_user_id",
                self.session_store.get_by_id_and_user_id(session_id, user_id),
            )
            .await?
            .ok_or(SessionError::NotFound("Session"))?;

        match self.codec.decode_ignoring_time(&session.refresh_token) {
            Ok(claims) => self.forget_token(claims.token_id).await,
            Err(e) => tracing::warn!(
                session_id = %session.id,
                error = %e,
                "Stored refresh token could not be decoded"
            ),
        }

        let audit = AuditEvent::session(AuditEvent::INVALIDATE)
            .user(user_id)
            .resource_id(session_id);

        let result = self
            .bounded(
                "session_store.invalidate_by_session_id_and_user_id",
                self.session_store
                    .invalidate_by_session_id_and_user_id(session_id, user_id),
            )
            .await;

        match result {
            Ok(_) => {
                tracing::info!(user_id = %user_id, session_id = %session_id, "Session revoked");
                self.audit(audit);
                Ok(())
            }
            Err(e) => {
                let err = durable_failure("invalidate session", e);
                self.audit(audit.failed(err.to_string()));
                Err(err)
            }
        }
    }
}

fn durable_failure(action: &str, err: SessionError) -> SessionError {
    err.log();
    SessionError::Internal(format!("Failed to {action}: {err}"))
}
