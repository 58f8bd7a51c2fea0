//! Session Entity
//!
//! Durable record of one issued refresh token. Created once at login,
//! afterwards only `is_valid` changes (true -> false, never back).

use std::fmt;

use chrono::{DateTime, Utc};
use kernel::id::{SessionId, UserId};
use platform::client::{DeviceInfo, classify_device};
use platform::crypto::redacted_fingerprint;
use serde::Serialize;

/// Client metadata captured at login
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl ClientMetadata {
    pub fn new(user_agent: Option<String>, ip_address: Option<String>) -> Self {
        Self {
            user_agent,
            ip_address,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    /// Full signed refresh token; unique across all rows
    pub refresh_token: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        user_id: UserId,
        refresh_token: String,
        client: ClientMetadata,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            refresh_token,
            user_agent: client.user_agent,
            ip_address: client.ip_address,
            is_valid: true,
            created_at: Utc::now(),
            expires_at,
        }
    }

    /// Clock half of the liveness check. A row without `expires_at` never
    /// expires here; the ephemeral index still bounds it.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// Durable half of the fail-closed check (the index is the other half)
    pub fn is_usable(&self) -> bool {
        self.is_valid && !self.is_expired()
    }

    pub fn invalidate(&mut self) {
        self.is_valid = false;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("refresh_token", &redacted_fingerprint(&self.refresh_token))
            .field("user_agent", &self.user_agent)
            .field("ip_address", &self.ip_address)
            .field("is_valid", &self.is_valid)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session as shown to its owner (no token material)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_valid: bool,
    pub is_current: bool,
    pub device: DeviceInfo,
}

impl SessionView {
    pub fn new(session: &Session, current: Option<SessionId>) -> Self {
        Self {
            id: session.id,
            user_agent: session.user_agent.clone(),
            ip_address: session.ip_address.clone(),
            created_at: session.created_at,
            expires_at: session.expires_at,
            is_valid: session.is_valid,
            is_current: current == Some(session.id),
            device: classify_device(session.user_agent.as_deref().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: Option<DateTime<Utc>>) -> Session {
        Session::new(
            UserId::new(),
            "header.payload.signature".to_string(),
            ClientMetadata::new(Some("Mozilla/5.0 (iPhone)".into()), Some("5.6.7.8".into())),
            expires_at,
        )
    }

    #[test]
    fn test_new_session_is_usable() {
        let s = session(Some(Utc::now() + Duration::days(7)));
        assert!(s.is_valid);
        assert!(!s.is_expired());
        assert!(s.is_usable());
    }

    #[test]
    fn test_expired_session_not_usable() {
        let s = session(Some(Utc::now() - Duration::seconds(1)));
        assert!(s.is_valid);
        assert!(s.is_expired());
        assert!(!s.is_usable());
    }

    #[test]
    fn test_missing_expiry_never_expires() {
        assert!(!session(None).is_expired());
    }

    #[test]
    fn test_invalidate_is_terminal() {
        let mut s = session(Some(Utc::now() + Duration::days(1)));
        s.invalidate();
        assert!(!s.is_usable());
    }

    #[test]
    fn test_debug_hides_refresh_token() {
        let s = session(None);
        let out = format!("{s:?}");
        assert!(!out.contains("header.payload.signature"));
    }

    #[test]
    fn test_view_flags_current_and_device() {
        let s = session(None);
        let view = SessionView::new(&s, Some(s.id));
        assert!(view.is_current);
        assert!(view.device.is_mobile);
        assert_eq!(view.device.device, "iPhone");

        let other = SessionView::new(&s, Some(SessionId::new()));
        assert!(!other.is_current);
        assert!(!SessionView::new(&s, None).is_current);
    }
}
