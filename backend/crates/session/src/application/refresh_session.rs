//! Refresh Session
//!
//! Exchanges a refresh token for a new access token. The refresh token is
//! returned unchanged; it is usable only while the ephemeral index and the
//! durable store both still vouch for it.

use crate::application::service::{SessionService, TokenPair};
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
    pub async fn refresh_session(&self, refresh_token: &str) -> SessionResult<TokenPair> {
        let claims = self.codec.validate(refresh_token)?;
        if !claims.is_kind(TokenKind::Refresh) {
            return Err(SessionError::Unauthenticated("invalid token type"));
        }

        // Ephemeral gate: absence wins even if the durable row is still valid
        let owner = self
            .bounded("token_index.get", self.token_index.get(claims.token_id))
            .await?;
        match owner {
            Some(owner) if owner == claims.user_id => {}
            Some(owner) => {
                tracing::warn!(
                    token_id = %claims.token_id,
                    claimed = %claims.user_id,
                    indexed = %owner,
                    "Refresh token owner mismatch"
                );
                return Err(SessionError::Unauthenticated("invalid refresh token"));
            }
            None => {
                return Err(SessionError::Unauthenticated(
                    "refresh token not found or expired",
                ));
            }
        }

        let session = self
            .bounded(
                "session_store.get_by_refresh_token",
                self.session_store.get_by_refresh_token(refresh_token),
            )
            .await?
            .ok_or(SessionError::Unauthenticated("session not found"))?;

        if !session.is_usable() {
            return Err(SessionError::Unauthenticated("session invalidated or expired"));
        }

        let user = self
            .bounded(
                "user_directory.get_by_id",
                self.user_directory.get_by_id(session.user_id),
            )
            .await?
            .ok_or(SessionError::Unauthenticated("user not found"))?;

        let access = self
            .codec
            .issue_access_token(user.id, &user.email, &user.full_name)?;

        tracing::debug!(user_id = %user.id, session_id = %session.id, "Session refreshed");

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.config.access_token_ttl_secs(),
        })
    }
}
