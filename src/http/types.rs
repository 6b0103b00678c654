//! Request and response bodies for the HTTP API.
//!
//! Every operation takes a statically-typed JSON body; required-field
//! validation happens in the handlers before any store access.

use serde::{Deserialize, Serialize};

use crate::services::kv::TTL_NONE;

fn default_ttl() -> i64 {
    TTL_NONE
}

/// POST /kv/set request. Omitting `ttl` means the entry never expires.
#[derive(Debug, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// `-1` or an absolute expiry instant in epoch milliseconds.
    #[serde(default = "default_ttl")]
    pub ttl: i64,
}

/// POST /kv/get request.
#[derive(Debug, Deserialize)]
pub struct GetRequest {
    #[serde(default)]
    pub key: String,
}

/// POST /kv/get response.
#[derive(Debug, Serialize)]
pub struct KeyValueResponse {
    pub key: String,
    pub value: String,
    pub ttl: i64,
}

/// POST /queue/send request.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub message: String,
}

/// POST /queue/receive request.
#[derive(Debug, Deserialize)]
pub struct ReceiveRequest {
    #[serde(default)]
    pub namespace: String,
    /// How long the claimed message stays hidden, in milliseconds.
    #[serde(default, rename = "visibilityTimeout")]
    pub visibility_timeout: i64,
}

/// POST /queue/receive response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub namespace: String,
    pub message: String,
}

/// POST /queue/delete request.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub namespace: String,
    pub id: i64,
}

/// POST /tenants response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of every 400 response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// GET /health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}
