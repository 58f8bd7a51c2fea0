//! Audit Sinks

use crate::domain::entity::audit_event::AuditEvent;
use crate::domain::repository::AuditSink;
use crate::error::SessionResult;

/// Emits each event as a structured `tracing` record on target `audit`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    async fn record(&self, event: &AuditEvent) -> SessionResult<()> {
        let user_id = event.user_id.map(|id| id.to_string());

        if event.success {
            tracing::info!(
                target: "audit",
                event_type = event.event_type,
                action = event.action,
                resource = event.resource,
                user_id = user_id.as_deref(),
                resource_id = event.resource_id.as_deref(),
                ip_address = event.ip_address.as_deref(),
                user_agent = event.user_agent.as_deref(),
                timestamp = %event.timestamp,
                "audit"
            );
        } else {
            tracing::warn!(
                target: "audit",
                event_type = event.event_type,
                action = event.action,
                resource = event.resource,
                user_id = user_id.as_deref(),
                resource_id = event.resource_id.as_deref(),
                ip_address = event.ip_address.as_deref(),
                user_agent = event.user_agent.as_deref(),
                error = event.error_message.as_deref(),
                timestamp = %event.timestamp,
                "audit failure"
            );
        }

        Ok(())
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: &AuditEvent) -> SessionResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::UserId;
    use tokio_test::assert_ok;

    fn events() -> [AuditEvent; 2] {
        let user_id = UserId::new();
        [
            AuditEvent::auth(AuditEvent::LOGIN)
                .user(user_id)
                .resource_id("session-1")
                .client(Some("10.0.0.1".into()), Some("curl/8.4.0".into())),
            AuditEvent::session(AuditEvent::INVALIDATE_ALL)
                .user(user_id)
                .failed("store unavailable"),
        ]
    }

    #[tokio::test]
    async fn test_tracing_sink_records_success_and_failure() {
        let sink = TracingAuditSink;
        for event in events() {
            assert_ok!(sink.record(&event).await);
        }
    }

    #[tokio::test]
    async fn test_tracing_sink_records_anonymous_event() {
        let event = AuditEvent::auth(AuditEvent::LOGOUT);
        assert_ok!(TracingAuditSink.record(&event).await);
    }

    #[tokio::test]
    async fn test_noop_sink_accepts_everything() {
        for event in events() {
            assert_ok!(NoopAuditSink.record(&event).await);
        }
    }
}
