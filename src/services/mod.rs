//! Core engines: tenant directory, KV cache, message queue.
//!
//! Each service is a thin `Clone` wrapper around the shared
//! [`Database`](crate::store::Database) handle. All data access is scoped by
//! tenant id inside the SQL predicates; the services never consult request
//! state.

pub mod kv;
pub mod queue;
pub mod tenants;
