//! Session Service
//!
//! Coordinates the token codec, the ephemeral token index and the durable
//! session store. Each operation lives in its own module as an `impl`
//! block on [`SessionService`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use kernel::id::TokenId;
use serde::Serialize;

use crate::application::config::SessionConfig;
use crate::application::token_codec::TokenCodec;
use crate::domain::entity::audit_event::AuditEvent;
use crate::domain::repository::{AuditSink, SessionStore, TokenIndex, UserDirectory};
use crate::error::{SessionError, SessionResult};

/// Credential pair handed back on login and refresh
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

pub struct SessionService<I, S, U, A>
where
    I: TokenIndex,
    S: SessionStore,
    U: UserDirectory,
    A: AuditSink,
{
    pub(crate) token_index: Arc<I>,
    pub(crate) session_store: Arc<S>,
    pub(crate) user_directory: Arc<U>,
    pub(crate) audit_sink: Arc<A>,
    pub(crate) codec: TokenCodec,
    pub(crate) config: Arc<SessionConfig>,
}

impl<I, S, U, A> SessionService<I, S, U, A>
where
    I: TokenIndex + Sync + 'static,
    S: SessionStore + Sync + 'static,
    U: UserDirectory + Sync + 'static,
    A: AuditSink + Sync + Send + 'static,
{
    /// Fails with `Config` when the signing secret is unusable
    pub fn new(
        token_index: Arc<I>,
        session_store: Arc<S>,
        user_directory: Arc<U>,
        audit_sink: Arc<A>,
        config: Arc<SessionConfig>,
    ) -> SessionResult<Self> {
        let codec = TokenCodec::new(&config)?;
        Ok(Self {
            token_index,
            session_store,
            user_directory,
            audit_sink,
            codec,
            config,
        })
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run a store call under the configured timeout
    pub(crate) async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = SessionResult<T>>,
    ) -> SessionResult<T> {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout(operation)),
        }
    }

    /// Best-effort removal from the ephemeral index
    pub(crate) async fn forget_token(&self, token_id: TokenId) {
        let result = self
            .bounded("token_index.delete", self.token_index.delete(token_id))
            .await;
        if let Err(e) = result {
            tracing::warn!(token_id = %token_id, error = %e, "Failed to drop refresh token from index");
        }
    }

    /// Hand an event to the audit sink without waiting for it
    pub(crate) fn audit(&self, event: AuditEvent) {
        let sink = Arc::clone(&self.audit_sink);
        tokio::spawn(async move {
            if let Err(e) = sink.record(&event).await {
                tracing::warn!(action = event.action, error = %e, "Failed to record audit event");
            }
        });
    }
}

impl<I, S, U, A> Clone for SessionService<I, S, U, A>
where
    I: TokenIndex,
    S: SessionStore,
    U: UserDirectory,
    A: AuditSink,
{
    fn clone(&self) -> Self {
        Self {
            token_index: Arc::clone(&self.token_index),
            session_store: Arc::clone(&self.session_store),
            user_directory: Arc::clone(&self.user_directory),
            audit_sink: Arc::clone(&self.audit_sink),
            codec: self.codec.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_serialization() {
        let pair = TokenPair {
            access_token: "a.b.c".into(),
            refresh_token: "d.e.f".into(),
            expires_in: 900,
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a.b.c");
        assert_eq!(json["refreshToken"], "d.e.f");
        assert_eq!(json["expiresIn"], 900);

        let debug = format!("{pair:?}");
        assert!(!debug.contains("a.b.c"));
        assert!(!debug.contains("d.e.f"));
    }
}
