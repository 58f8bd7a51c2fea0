//! List Sessions
//!
//! Active sessions of a user, annotated with device info and which one the
//! caller is using.

use kernel::id::UserId;

use crate::application::service::SessionService;
use crate::domain::entity::session::SessionView;
use crate::domain::repository::{AuditSink, SessionStore, TokenIndex, UserDirectory};
use crate::error::SessionResult;

impl<I, S, U, A> SessionService<I, S, U, A>
where
    I: TokenIndex + Sync + 'static,
    S: SessionStore + Sync + 'static,
    U: UserDirectory + Sync + 'static,
    A: AuditSink + Sync + Send + 'static,
{
    /// Invalidated sessions are omitted. Sessions past `expires_at` that were
    /// never invalidated are still listed until the janitor removes them.
    pub async fn get_user_sessions(
        &self,
        user_id: UserId,
        current_refresh_token: Option<&str>,
    ) -> SessionResult<Vec<SessionView>> {
        let sessions = self
            .bounded(
                "session_store.get_by_user_id",
                self.session_store.get_by_user_id(user_id),
            )
            .await?;

        let current = match current_refresh_token {
            Some(token) => self
                .bounded(
                    "session_store.get_by_refresh_token",
                    self.session_store.get_by_refresh_token(token),
                )
                .await
                .unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "Current session lookup failed");
                    None
                })
                .filter(|s| s.user_id == user_id)
                .map(|s| s.id),
            None => None,
        };

        Ok(sessions
            .iter()
            .filter(|s| s.is_valid)
            .map(|s| SessionView::new(s, current))
            .collect())
    }
}
