//! Tenant directory: credential issuance and resolution.
//!
//! A tenant is an isolated namespace of data identified by an opaque bearer
//! credential. The credential is 32 bytes from the thread-local CSPRNG,
//! base64 encoded, generated once at provisioning and never mutated.
//!
//! Resolution never distinguishes a missing credential from an unknown one:
//! both come back as `None` and surface as the same authorization failure.

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::RngCore;
use rusqlite::{OptionalExtension, params};

use crate::store::{Database, now_millis};

/// Raw credential length in bytes before base64 encoding.
const TOKEN_BYTES: usize = 32;

/// A resolved tenant identity. Scopes every KV and queue operation.
#[derive(Debug, Clone)]
pub struct Tenant {
    pub id: i64,
}

/// Directory of provisioned tenants.
#[derive(Clone)]
pub struct TenantDirectory {
    db: Database,
}

impl TenantDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Provisions a new tenant and returns its credential.
    ///
    /// Collisions are not checked for up front; the UNIQUE constraint on the
    /// token column turns the astronomically unlikely duplicate into an
    /// internal error instead of a silent overwrite.
    ///
    /// # Errors
    ///
    /// Returns an error if credential generation or the insert fails.
    pub async fn create(&self) -> Result<String> {
        let mut raw = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut raw);
        let token = STANDARD.encode(raw);

        let stored = token.clone();
        let now = now_millis();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO tenants (token, created_at) VALUES (?1, ?2)",
                    params![stored, now],
                )
                .context("Failed to insert tenant")?;
                Ok(())
            })
            .await?;

        Ok(token)
    }

    /// Looks up the tenant owning the exact credential.
    ///
    /// Returns `Ok(None)` for any non-match, whatever the reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    pub async fn resolve(&self, token: &str) -> Result<Option<Tenant>> {
        let token = token.to_string();
        self.db
            .call(move |conn| {
                let id = conn
                    .query_row(
                        "SELECT id FROM tenants WHERE token = ?1",
                        [token.as_str()],
                        |row| row.get::<_, i64>(0),
                    )
                    .optional()
                    .context("Failed to look up tenant")?;
                Ok(id.map(|id| Tenant { id }))
            })
            .await
    }
}
