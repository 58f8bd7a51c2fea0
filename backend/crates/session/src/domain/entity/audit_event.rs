//! Audit Event
//!
//! Fire-and-forget record of a login, logout or session invalidation.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event_type: &'static str,
    pub action: &'static str,
    pub resource: &'static str,
    pub user_id: Option<UserId>,
    pub resource_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub const LOGIN: &'static str = "login";
    pub const LOGOUT: &'static str = "logout";
    pub const INVALIDATE: &'static str = "invalidate";
    pub const INVALIDATE_ALL: &'static str = "invalidate_all";

    pub fn new(event_type: &'static str, action: &'static str, resource: &'static str) -> Self {
        Self {
            event_type,
            action,
            resource,
            user_id: None,
            resource_id: None,
            ip_address: None,
            user_agent: None,
            success: true,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    /// `auth` event against the `session` resource
    pub fn auth(action: &'static str) -> Self {
        Self::new("auth", action, "session")
    }

    /// `session` management event against the `session` resource
    pub fn session(action: &'static str) -> Self {
        Self::new("session", action, "session")
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.success = false;
        self.error_message = Some(message.into());
        self
    }
}
