//! Prometheus metrics for the notification gateway.
//!
//! - Dispatch metrics (sync sends, async submissions, fallback failures)
//! - Provider metrics (attempts, retries)
//! - Audit metrics (lifecycle events received, by kind)
//! - Status store metrics (tracked transactions)

mod helpers;

pub use helpers::{encode_metrics, AuditMetrics, DispatchMetrics, ProviderMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "gateway";

lazy_static! {
    // ============================================================================
    // Dispatch Metrics
    // ============================================================================

    /// Notifications handed to a provider, by channel and mode (sync/async)
    pub static ref DISPATCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatches_total", METRIC_PREFIX),
        "Total notifications dispatched to providers",
        &["channel", "mode"]
    ).unwrap();

    /// Synchronous sends that returned an error to the caller
    pub static ref SYNC_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_sync_failures_total", METRIC_PREFIX),
        "Total synchronous sends that failed",
        &["channel"]
    ).unwrap();

    /// FAILED records written by the dispatcher fallback
    pub static ref FALLBACK_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_fallback_failures_total", METRIC_PREFIX),
        "Total asynchronous dispatches marked FAILED without a provider event",
        &["channel"]
    ).unwrap();

    /// Synchronous send latency
    pub static ref SYNC_SEND_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_sync_send_latency_seconds", METRIC_PREFIX),
        "Synchronous send latency in seconds",
        &["channel"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0]
    ).unwrap();

    // ============================================================================
    // Provider Metrics
    // ============================================================================

    /// Delivery attempts made against provider transports
    pub static ref PROVIDER_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_provider_attempts_total", METRIC_PREFIX),
        "Total provider delivery attempts",
        &["channel"]
    ).unwrap();

    /// Attempts that failed and were retried
    pub static ref PROVIDER_RETRIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_provider_retries_total", METRIC_PREFIX),
        "Total provider delivery retries",
        &["channel"]
    ).unwrap();

    // ============================================================================
    // Audit Metrics
    // ============================================================================

    /// Lifecycle events received by the audit listener
    pub static ref AUDIT_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_audit_events_total", METRIC_PREFIX),
        "Total lifecycle events received by the audit listener",
        &["kind"]
    ).unwrap();

    /// Audit writes the store rejected or failed
    pub static ref AUDIT_WRITE_ERRORS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_audit_write_errors_total", METRIC_PREFIX),
        "Total audit status writes that could not be stored"
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Transactions with a delivery status record
    pub static ref STATUS_RECORDS: IntGauge = register_int_gauge!(
        format!("{}_status_records", METRIC_PREFIX),
        "Number of transactions with a delivery status record"
    ).unwrap();
}
