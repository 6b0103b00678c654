//! Per-operation counters for the HTTP API.

use metrics::counter;

pub(crate) fn record_tenant_operation(operation: &'static str) {
    counter!("bodega_tenant_operations_total", "operation" => operation).increment(1);
}

pub(crate) fn record_kv_operation(operation: &'static str) {
    counter!("bodega_kv_operations_total", "operation" => operation).increment(1);
}

pub(crate) fn record_queue_operation(operation: &'static str) {
    counter!("bodega_queue_operations_total", "operation" => operation).increment(1);
}
