//! HTTP API for the daemon.
//!
//! The handlers are the only layer that speaks HTTP: the engines produce
//! typed outcomes and the [`AppError`] taxonomy maps them to status codes.
//!
//! - `Unauthorized` -> 401, empty body (never says why)
//! - `BadRequest` -> 400, `{"message": ...}` body
//! - `NotFound` -> 404, empty body
//! - `Internal` -> 500, empty body; operation name and cause are logged

pub mod audit;
pub mod auth;
mod handlers;
mod metrics;
pub mod types;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use thiserror::Error;

use crate::services::{kv::KvStore, queue::QueueService, tenants::TenantDirectory};
use crate::store::Database;
use types::ErrorResponse;

/// Shared application state: one handle per engine, all `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub tenants: TenantDirectory,
    pub kv: KvStore,
    pub queue: QueueService,
}

impl AppState {
    /// Builds the engines over a single shared database handle.
    pub fn new(db: Database) -> Self {
        Self {
            tenants: TenantDirectory::new(db.clone()),
            kv: KvStore::new(db.clone()),
            queue: QueueService::new(db),
        }
    }
}

/// Request-level error taxonomy, translated to status codes by
/// `IntoResponse`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("{op} failed")]
    Internal {
        op: &'static str,
        cause: anyhow::Error,
    },
}

impl AppError {
    /// Wraps a store/engine failure, tagging it with the operation name for
    /// the log line.
    ///
    /// ```ignore
    /// state.kv.set(..).await.map_err(AppError::internal("kv_set"))?;
    /// ```
    pub fn internal(op: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| Self::Internal { op, cause }
    }

    fn bad_json() -> Self {
        Self::BadRequest("error parsing JSON".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            },
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Internal { op, cause } => {
                // The cause stays in the log; the caller gets an opaque 500.
                tracing::error!(operation = op, error = ?cause, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            },
        }
    }
}

/// Builds the daemon router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/tenants", post(handlers::tenant_create))
        .route("/kv/set", post(handlers::kv_set))
        .route("/kv/get", post(handlers::kv_get))
        .route("/queue/send", post(handlers::queue_send))
        .route("/queue/receive", post(handlers::queue_receive))
        .route("/queue/delete", post(handlers::queue_delete))
        .with_state(state)
}
