//! Bearer-token authentication extractor.
//!
//! Every authenticated handler takes a [`Tenant`] argument; extraction
//! resolves the `Authorization: Bearer <token>` header through the tenant
//! directory before the handler body runs. A missing header, a malformed
//! header, and an unknown token all produce the same opaque 401.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use super::{AppError, AppState, audit};
use crate::services::tenants::Tenant;

impl FromRequestParts<AppState> for Tenant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The Bearer prefix is stripped when present; anything else is
        // looked up as a raw token.
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
            .unwrap_or("");

        let tenant = state
            .tenants
            .resolve(token)
            .await
            .map_err(AppError::internal("auth"))?;

        match tenant {
            Some(tenant) => Ok(tenant),
            None => {
                audit::log_audit_event(audit::AuditEvent::AuthFailure {
                    reason: "missing or unknown bearer token".to_string(),
                });
                Err(AppError::Unauthorized)
            },
        }
    }
}
