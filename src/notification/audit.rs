//! Audit listener that turns provider lifecycle events into delivery statuses.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DeliveryStatusRecord, NotificationOutcome};
use crate::metrics::AuditMetrics;
use crate::provider::{LifecycleEvent, NotificationSubscriber};
use crate::store::{SaveOutcome, StatusStore};
use crate::telemetry::{annotate_current_span, attributes};

/// Records the terminal delivery status of each notification.
///
/// Registered once with every channel's notification service. The notification
/// ID of an event is the ID of the transaction that produced it.
pub struct TransactionAuditListener {
    store: Arc<dyn StatusStore>,
}

impl TransactionAuditListener {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    async fn update_status(&self, transaction_id: Uuid, record: DeliveryStatusRecord) {
        let status = record.status;
        annotate_current_span([
            attributes::transaction_id(transaction_id),
            attributes::delivery_status(status),
        ]);

        match self.store.save(record).await {
            Ok(SaveOutcome::Written) => {
                tracing::info!(
                    transaction_id = %transaction_id,
                    status = %status,
                    "Transaction delivery status updated"
                );
            }
            Ok(SaveOutcome::TerminalKept) => {
                tracing::debug!(
                    transaction_id = %transaction_id,
                    status = %status,
                    "Transaction already terminal, event not recorded"
                );
            }
            Err(e) => {
                AuditMetrics::record_write_error();
                tracing::error!(
                    transaction_id = %transaction_id,
                    status = %status,
                    error = %e,
                    "Failed to record delivery status"
                );
            }
        }
    }
}

#[async_trait]
impl NotificationSubscriber for TransactionAuditListener {
    async fn on_event(&self, event: &LifecycleEvent) {
        AuditMetrics::record_event(event.kind());

        match event {
            LifecycleEvent::Sent {
                notification_id,
                provider,
                channel,
            } => {
                tracing::debug!(
                    notification_id = %notification_id,
                    provider = %provider,
                    channel = %channel,
                    "Notification sent"
                );
                let outcome = NotificationOutcome::success(notification_id.to_string(), provider);
                self.update_status(
                    *notification_id,
                    DeliveryStatusRecord::completed(*notification_id, outcome),
                )
                .await;
            }
            LifecycleEvent::Failed {
                notification_id,
                provider,
                channel,
                error_message,
            } => {
                tracing::debug!(
                    notification_id = %notification_id,
                    provider = %provider,
                    channel = %channel,
                    error = %error_message,
                    "Notification failed"
                );
                let outcome = NotificationOutcome::failure(
                    notification_id.to_string(),
                    provider,
                    error_message,
                );
                self.update_status(
                    *notification_id,
                    DeliveryStatusRecord::failed(*notification_id, outcome),
                )
                .await;
            }
            other => {
                tracing::debug!(
                    notification_id = %other.notification_id(),
                    kind = other.kind(),
                    "Ignoring lifecycle event"
                );
            }
        }
    }
}
