use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{Channel, DeliveryStatusRecord, NotificationOutcome, Transaction};
use crate::metrics::DispatchMetrics;
use crate::provider::{
    Notification, NotificationResult, NotificationService, NotifyError, Recipient,
    CUSTOMER_ID_KEY, DEVICE_TOKEN_KEY,
};
use crate::store::{SaveOutcome, StatusStore};
use crate::telemetry::{annotate_current_span, attributes};

/// Statistics for the notification dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Synchronous sends attempted
    pub sync_sent: AtomicU64,
    /// Synchronous sends that returned an error
    pub sync_failed: AtomicU64,
    /// Asynchronous dispatches submitted
    pub async_submitted: AtomicU64,
    /// FAILED records written by the fallback path
    pub fallback_failures: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            sync_sent: self.sync_sent.load(Ordering::Relaxed),
            sync_failed: self.sync_failed.load(Ordering::Relaxed),
            async_submitted: self.async_submitted.load(Ordering::Relaxed),
            fallback_failures: self.fallback_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub sync_sent: u64,
    pub sync_failed: u64,
    pub async_submitted: u64,
    pub fallback_failures: u64,
}

/// Handle to a fire-and-forget dispatch.
///
/// Deliberately not a `Future`: callers observe the outcome through the
/// status store, never by waiting on the handle.
#[derive(Debug)]
pub struct DispatchHandle {
    transaction_id: Uuid,
    task: Option<JoinHandle<()>>,
}

impl DispatchHandle {
    fn new(transaction_id: Uuid, task: Option<JoinHandle<()>>) -> Self {
        Self {
            transaction_id,
            task,
        }
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    /// Whether the dispatch has settled. Rejected submissions settle immediately.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }
}

impl From<NotificationResult> for NotificationOutcome {
    fn from(result: NotificationResult) -> Self {
        NotificationOutcome {
            success: result.success,
            message_id: result.notification_id.to_string(),
            provider: result.provider_name,
            error_message: result.error_message,
        }
    }
}

/// Writes FAILED for dispatches that failed without a provider event
#[derive(Clone)]
struct FallbackRecorder {
    channel: Channel,
    provider: String,
    store: Arc<dyn StatusStore>,
    stats: Arc<DispatcherStats>,
}

impl FallbackRecorder {
    async fn record(&self, transaction_id: Uuid, error: &NotifyError) {
        let outcome = NotificationOutcome::failure(
            transaction_id.to_string(),
            self.provider.clone(),
            error.to_string(),
        );

        match self
            .store
            .save(DeliveryStatusRecord::failed(transaction_id, outcome))
            .await
        {
            Ok(SaveOutcome::Written) => {
                self.stats.fallback_failures.fetch_add(1, Ordering::Relaxed);
                DispatchMetrics::record_fallback(self.channel);
                tracing::warn!(
                    transaction_id = %transaction_id,
                    channel = %self.channel,
                    error = %error,
                    "Dispatch failed before any provider event, marked FAILED"
                );
            }
            Ok(SaveOutcome::TerminalKept) => {
                tracing::debug!(
                    transaction_id = %transaction_id,
                    error = %error,
                    "Dispatch failure not recorded, transaction already terminal"
                );
            }
            Err(e) => {
                tracing::error!(
                    transaction_id = %transaction_id,
                    error = %e,
                    dispatch_error = %error,
                    "Failed to record dispatch failure"
                );
            }
        }
    }
}

/// Sends transaction notifications over one channel.
///
/// Channels differ only in which recipient fields they need; the adapter fills
/// them from the transaction and leaves validation to the provider service.
pub struct ChannelAdapter {
    channel: Channel,
    service: Arc<NotificationService>,
    fallback: FallbackRecorder,
    stats: Arc<DispatcherStats>,
}

impl ChannelAdapter {
    pub fn new(
        service: Arc<NotificationService>,
        store: Arc<dyn StatusStore>,
        stats: Arc<DispatcherStats>,
    ) -> Self {
        let channel = service.channel();
        let fallback = FallbackRecorder {
            channel,
            provider: service.provider_name().to_string(),
            store,
            stats: stats.clone(),
        };

        Self {
            channel,
            service,
            fallback,
            stats,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn service(&self) -> &Arc<NotificationService> {
        &self.service
    }

    /// Send and wait for the provider's final answer.
    ///
    /// Errors are returned unchanged. The status store is not touched.
    #[tracing::instrument(
        name = "dispatcher.send_sync",
        skip(self, transaction, message),
        fields(transaction_id = %transaction.id, channel = %self.channel)
    )]
    pub async fn send_sync(
        &self,
        transaction: &Transaction,
        message: &str,
    ) -> Result<NotificationOutcome, NotifyError> {
        self.annotate(transaction.id);
        let notification = self.build_notification(transaction, message);
        let started = Instant::now();

        let result = self.service.send(notification).await;

        self.stats.sync_sent.fetch_add(1, Ordering::Relaxed);
        DispatchMetrics::record_sync(self.channel, started.elapsed().as_secs_f64());

        match result {
            Ok(result) => {
                tracing::debug!(
                    transaction_id = %transaction.id,
                    provider = %result.provider_name,
                    "Notification sent"
                );
                Ok(result.into())
            }
            Err(e) => {
                self.stats.sync_failed.fetch_add(1, Ordering::Relaxed);
                DispatchMetrics::record_sync_failure(self.channel);
                tracing::warn!(
                    transaction_id = %transaction.id,
                    error = %e,
                    "Synchronous notification failed"
                );
                Err(e)
            }
        }
    }

    /// Submit without waiting for delivery.
    ///
    /// Returns once the provider has accepted or rejected the submission. A
    /// rejected submission, or a delivery that later fails without a provider
    /// event, is recorded as FAILED in the status store. Nothing is ever
    /// returned to the caller as an error.
    #[tracing::instrument(
        name = "dispatcher.send_async",
        skip(self, transaction, message),
        fields(transaction_id = %transaction.id, channel = %self.channel)
    )]
    pub async fn send_async(&self, transaction: &Transaction, message: &str) -> DispatchHandle {
        let transaction_id = transaction.id;
        self.annotate(transaction_id);
        let notification = self.build_notification(transaction, message);

        self.stats.async_submitted.fetch_add(1, Ordering::Relaxed);
        DispatchMetrics::record_async(self.channel);

        match self.service.send_async(notification) {
            Ok(pending) => {
                let fallback = self.fallback.clone();
                let task = tokio::spawn(async move {
                    match pending.await {
                        Ok(_) => {
                            tracing::debug!(
                                transaction_id = %transaction_id,
                                "Async notification dispatched, final status comes from the audit listener"
                            );
                        }
                        Err(e) if e.is_reported() => {
                            tracing::debug!(
                                transaction_id = %transaction_id,
                                error = %e,
                                "Async notification failed, reported through lifecycle event"
                            );
                        }
                        Err(e) => fallback.record(transaction_id, &e).await,
                    }
                });
                DispatchHandle::new(transaction_id, Some(task))
            }
            Err(e) => {
                self.fallback.record(transaction_id, &e).await;
                DispatchHandle::new(transaction_id, None)
            }
        }
    }

    fn annotate(&self, transaction_id: Uuid) {
        annotate_current_span([
            attributes::transaction_id(transaction_id),
            attributes::channel(self.channel),
            attributes::provider(self.service.provider_name()),
        ]);
    }

    fn build_notification(&self, transaction: &Transaction, message: &str) -> Notification {
        let mut recipient = Recipient::new(&transaction.email, &transaction.phone)
            .with_metadata(CUSTOMER_ID_KEY, &transaction.customer_name);

        if self.channel == Channel::Push {
            match transaction.device_token() {
                Some(token) => recipient = recipient.with_metadata(DEVICE_TOKEN_KEY, token),
                None => tracing::warn!(
                    transaction_id = %transaction.id,
                    "Device token missing, push delivery will be rejected"
                ),
            }
        }

        Notification::new(transaction.id, recipient, message)
    }
}

/// Routes transaction notifications to the adapter for each channel
pub struct NotificationDispatcher {
    adapters: HashMap<Channel, ChannelAdapter>,
    store: Arc<dyn StatusStore>,
    stats: Arc<DispatcherStats>,
}

impl NotificationDispatcher {
    /// Create a dispatcher with one adapter per service.
    ///
    /// A later service for the same channel replaces an earlier one.
    pub fn new(services: Vec<Arc<NotificationService>>, store: Arc<dyn StatusStore>) -> Self {
        let stats = Arc::new(DispatcherStats::default());
        let adapters = services
            .into_iter()
            .map(|service| {
                let adapter = ChannelAdapter::new(service, store.clone(), stats.clone());
                (adapter.channel(), adapter)
            })
            .collect();

        Self {
            adapters,
            store,
            stats,
        }
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| self.adapters.contains_key(channel))
            .collect()
    }

    pub fn adapter(&self, channel: Channel) -> Result<&ChannelAdapter, NotifyError> {
        self.adapters.get(&channel).ok_or_else(|| {
            NotifyError::Unavailable(format!("no notification service configured for {}", channel))
        })
    }

    /// Synchronous send over `channel`; see `ChannelAdapter::send_sync`
    pub async fn send_sync(
        &self,
        channel: Channel,
        transaction: &Transaction,
        message: &str,
    ) -> Result<NotificationOutcome, NotifyError> {
        self.adapter(channel)?.send_sync(transaction, message).await
    }

    /// Fire-and-forget send over `channel`; see `ChannelAdapter::send_async`
    pub async fn send_async(
        &self,
        channel: Channel,
        transaction: &Transaction,
        message: &str,
    ) -> DispatchHandle {
        match self.adapter(channel) {
            Ok(adapter) => adapter.send_async(transaction, message).await,
            Err(e) => {
                let fallback = FallbackRecorder {
                    channel,
                    provider: channel.label().to_string(),
                    store: self.store.clone(),
                    stats: self.stats.clone(),
                };
                fallback.record(transaction.id, &e).await;
                DispatchHandle::new(transaction.id, None)
            }
        }
    }

    /// Stop every channel's service from accepting new submissions
    pub fn shutdown(&self) {
        for adapter in self.adapters.values() {
            adapter.service.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let id = Uuid::new_v4();
        let outcome: NotificationOutcome =
            NotificationResult::success(id, "firebase", Channel::Push).into();
        assert!(outcome.success);
        assert_eq!(outcome.message_id, id.to_string());
        assert_eq!(outcome.provider, "firebase");
        assert_eq!(outcome.error_message, None);
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = DispatcherStats::default();
        stats.async_submitted.fetch_add(10, Ordering::Relaxed);
        stats.fallback_failures.fetch_add(2, Ordering::Relaxed);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.async_submitted, 10);
        assert_eq!(snapshot.fallback_failures, 2);
        assert_eq!(snapshot.sync_sent, 0);
    }

    #[test]
    fn test_rejected_handle_is_finished() {
        let handle = DispatchHandle::new(Uuid::nil(), None);
        assert!(handle.is_finished());
        assert_eq!(handle.transaction_id(), Uuid::nil());
    }
}
