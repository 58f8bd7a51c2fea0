//! Create Session
//!
//! Issues a token pair for an already authenticated user and records the
//! refresh token in both stores.

use crate::application::service::{SessionService, TokenPair};
use crate::domain::entity::{
    audit_event::AuditEvent,
    session::{ClientMetadata, Session},
    user::User,
};
use crate::domain::repository::{AuditSink, SessionStore, TokenIndex, UserDirectory};
use crate::error::{SessionError, SessionResult};

impl<I, S, U, A> SessionService<I, S, U, A>
where
    I: TokenIndex + Sync + 'static,
    S: SessionStore + Sync + 'static,
    U: UserDirectory + Sync + 'static,
    A: AuditSink + Sync + Send + 'static,
{
    pub async fn create_session(
        &self,
        user: &User,
        client: ClientMetadata,
    ) -> SessionResult<TokenPair> {
        let audit = AuditEvent::auth(AuditEvent::LOGIN)
            .user(user.id)
            .client(client.ip_address.clone(), client.user_agent.clone());

        match self.issue_and_store(user, client).await {
            Ok((pair, session)) => {
                tracing::info!(
                    user_id = %user.id,
                    session_id = %session.id,
                    "Session created"
                );
                self.audit(audit.resource_id(session.id));
                Ok(pair)
            }
            Err(e) => {
                e.log();
                self.audit(audit.failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn issue_and_store(
        &self,
        user: &User,
        client: ClientMetadata,
    ) -> SessionResult<(TokenPair, Session)> {
        let access = self
            .codec
            .issue_access_token(user.id, &user.email, &user.full_name)?;
        let refresh = self.codec.issue_refresh_token(user.id, &user.email)?;
        let token_id = refresh.claims.token_id;

        self.bounded(
            "token_index.put",
            self.token_index
                .put(token_id, user.id, self.config.refresh_token_ttl),
        )
        .await
        .map_err(|e| SessionError::Internal(format!("Failed to index refresh token: {e}")))?;

        let session = Session::new(
            user.id,
            refresh.token.clone(),
            client,
            refresh.claims.expiry(),
        );

        let persisted = self
            .bounded("session_store.create", self.session_store.create(&session))
            .await;
        if let Err(e) = persisted {
            // Without a durable row the index entry would be an orphan
            self.forget_token(token_id).await;
            return Err(SessionError::Internal(format!("Failed to persist session: {e}")));
        }

        let pair = TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: self.config.access_token_ttl_secs(),
        };
        Ok((pair, session))
    }
}
