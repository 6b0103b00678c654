//! Tenant provisioning handler.

use axum::{Json, extract::State};

use super::super::types::TokenResponse;
use super::super::{AppError, AppState, audit, metrics};

/// POST /tenants - Provision a tenant and return its credential.
///
/// The credential is returned exactly once; it is not retrievable later.
pub(crate) async fn tenant_create(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, AppError> {
    metrics::record_tenant_operation("create");
    let token = state
        .tenants
        .create()
        .await
        .map_err(AppError::internal("tenant_create"))?;

    audit::log_audit_event(audit::AuditEvent::TenantCreated);
    Ok(Json(TokenResponse { token }))
}
