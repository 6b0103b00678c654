//! HTTP API handlers organized by service.

pub(crate) mod kv;
pub(crate) mod queue;
pub(crate) mod tenants;

// Re-export all handlers for use in routing
pub(crate) use kv::{kv_get, kv_set};
pub(crate) use queue::{queue_delete, queue_receive, queue_send};
pub(crate) use tenants::tenant_create;

use axum::Json;
use chrono::Utc;

use super::types::HealthResponse;

/// GET /health - Daemon liveness probe.
pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ready",
        timestamp: Utc::now().to_rfc3339(),
    })
}
