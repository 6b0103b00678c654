//! KV cache handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use super::super::types::{GetRequest, KeyValueResponse, SetRequest};
use super::super::{AppError, AppState, metrics};
use crate::services::tenants::Tenant;

/// POST /kv/set - Create or replace a key.
pub(crate) async fn kv_set(
    State(state): State<AppState>,
    tenant: Tenant,
    body: Result<Json<SetRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    metrics::record_kv_operation("set");
    let Json(req) = body.map_err(|_| AppError::bad_json())?;
    if req.key.is_empty() {
        return Err(AppError::BadRequest(
            "key must not be empty or missing".to_string(),
        ));
    }

    state
        .kv
        .set(tenant.id, &req.key, &req.value, req.ttl)
        .await
        .map_err(AppError::internal("kv_set"))?;

    Ok(StatusCode::OK)
}

/// POST /kv/get - Look up a live key.
pub(crate) async fn kv_get(
    State(state): State<AppState>,
    tenant: Tenant,
    body: Result<Json<GetRequest>, JsonRejection>,
) -> Result<Json<KeyValueResponse>, AppError> {
    metrics::record_kv_operation("get");
    let Json(req) = body.map_err(|_| AppError::bad_json())?;
    if req.key.is_empty() {
        return Err(AppError::BadRequest(
            "expected key to be non-empty".to_string(),
        ));
    }

    let entry = state
        .kv
        .get(tenant.id, &req.key)
        .await
        .map_err(AppError::internal("kv_get"))?
        .ok_or(AppError::NotFound)?;

    Ok(Json(KeyValueResponse {
        key: entry.key,
        value: entry.value,
        ttl: entry.ttl,
    }))
}
