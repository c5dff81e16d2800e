//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use crate::domain::Channel;

use super::{
    AUDIT_EVENTS_TOTAL, AUDIT_WRITE_ERRORS_TOTAL, DISPATCHES_TOTAL, FALLBACK_FAILURES_TOTAL,
    PROVIDER_ATTEMPTS_TOTAL, PROVIDER_RETRIES_TOTAL, SYNC_FAILURES_TOTAL,
    SYNC_SEND_LATENCY,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording dispatcher metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    /// Record a synchronous send and its latency
    pub fn record_sync(channel: Channel, latency_secs: f64) {
        DISPATCHES_TOTAL
            .with_label_values(&[channel.label(), "sync"])
            .inc();
        SYNC_SEND_LATENCY
            .with_label_values(&[channel.label()])
            .observe(latency_secs);
    }

    /// Record a synchronous send that failed
    pub fn record_sync_failure(channel: Channel) {
        SYNC_FAILURES_TOTAL.with_label_values(&[channel.label()]).inc();
    }

    /// Record an asynchronous submission
    pub fn record_async(channel: Channel) {
        DISPATCHES_TOTAL
            .with_label_values(&[channel.label(), "async"])
            .inc();
    }

    /// Record a FAILED record written by the fallback path
    pub fn record_fallback(channel: Channel) {
        FALLBACK_FAILURES_TOTAL
            .with_label_values(&[channel.label()])
            .inc();
    }
}

/// Helper struct for recording provider metrics
pub struct ProviderMetrics;

impl ProviderMetrics {
    pub fn record_attempt(channel: Channel) {
        PROVIDER_ATTEMPTS_TOTAL
            .with_label_values(&[channel.label()])
            .inc();
    }

    pub fn record_retry(channel: Channel) {
        PROVIDER_RETRIES_TOTAL
            .with_label_values(&[channel.label()])
            .inc();
    }
}

/// Helper struct for recording audit listener metrics
pub struct AuditMetrics;

impl AuditMetrics {
    /// Record a received lifecycle event
    pub fn record_event(kind: &str) {
        AUDIT_EVENTS_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a status write that could not be stored
    pub fn record_write_error() {
        AUDIT_WRITE_ERRORS_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_recorded_metrics() {
        DispatchMetrics::record_async(Channel::Push);
        ProviderMetrics::record_attempt(Channel::Push);
        AuditMetrics::record_event("sent");

        let output = encode_metrics().unwrap();
        assert!(output.contains("gateway_dispatches_total"));
        assert!(output.contains("gateway_provider_attempts_total"));
        assert!(output.contains("gateway_audit_events_total"));
    }
}
