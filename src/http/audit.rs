//! Security audit logging for daemon events.
//!
//! Structured log lines under the `audit` target for security-relevant
//! events, separable from operational logs by filtering on the target.

use tracing::{info, warn};

/// Security audit events that should be logged for monitoring and alerting.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Failed authentication attempt
    AuthFailure { reason: String },
    /// A new tenant was provisioned
    TenantCreated,
}

/// Log a security audit event with structured fields.
pub fn log_audit_event(event: AuditEvent) {
    match event {
        AuditEvent::AuthFailure { reason } => {
            warn!(
                target: "audit",
                event_type = "auth_failure",
                %reason,
                "Authentication failed"
            );
        },
        AuditEvent::TenantCreated => {
            info!(
                target: "audit",
                event_type = "tenant_created",
                "Tenant provisioned"
            );
        },
    }
}
