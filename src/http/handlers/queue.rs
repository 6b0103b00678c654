//! Queue handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use super::super::types::{DeleteRequest, MessageResponse, ReceiveRequest, SendRequest};
use super::super::{AppError, AppState, metrics};
use crate::services::tenants::Tenant;

/// POST /queue/send - Enqueue a message in a namespace.
pub(crate) async fn queue_send(
    State(state): State<AppState>,
    tenant: Tenant,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    metrics::record_queue_operation("send");
    let Json(req) = body.map_err(|_| AppError::bad_json())?;
    if req.namespace.is_empty() {
        return Err(AppError::BadRequest(
            "namespace must not be empty or missing".to_string(),
        ));
    }
    if req.message.is_empty() {
        return Err(AppError::BadRequest(
            "message must not be empty or missing".to_string(),
        ));
    }

    state
        .queue
        .send(tenant.id, &req.namespace, &req.message)
        .await
        .map_err(AppError::internal("queue_send"))?;

    Ok(StatusCode::OK)
}

/// POST /queue/receive - Claim the oldest eligible message.
pub(crate) async fn queue_receive(
    State(state): State<AppState>,
    tenant: Tenant,
    body: Result<Json<ReceiveRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    metrics::record_queue_operation("receive");
    let Json(req) = body.map_err(|_| AppError::bad_json())?;
    if req.namespace.is_empty() {
        return Err(AppError::BadRequest(
            "namespace must not be empty or missing".to_string(),
        ));
    }
    if req.visibility_timeout < 0 {
        return Err(AppError::BadRequest(
            "visibilityTimeout must not be negative".to_string(),
        ));
    }

    let message = state
        .queue
        .receive(tenant.id, &req.namespace, req.visibility_timeout)
        .await
        .map_err(AppError::internal("queue_receive"))?
        .ok_or(AppError::NotFound)?;

    Ok(Json(MessageResponse {
        id: message.id,
        namespace: message.namespace,
        message: message.message,
    }))
}

/// POST /queue/delete - Acknowledge a message by removing it.
pub(crate) async fn queue_delete(
    State(state): State<AppState>,
    tenant: Tenant,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    metrics::record_queue_operation("delete");
    let Json(req) = body.map_err(|_| AppError::bad_json())?;
    if req.namespace.is_empty() {
        return Err(AppError::BadRequest(
            "namespace must not be empty or missing".to_string(),
        ));
    }

    let deleted = state
        .queue
        .delete(tenant.id, &req.namespace, req.id)
        .await
        .map_err(AppError::internal("queue_delete"))?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::OK)
}
