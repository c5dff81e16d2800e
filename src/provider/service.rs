use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::domain::Channel;
use crate::metrics::ProviderMetrics;

use super::types::{
    LifecycleEvent, Notification, NotificationResult, NotifyError, ProviderError,
};

/// Transport that physically delivers a notification.
///
/// Implementations are opaque gateways (SMTP relay, SMS API, push service).
/// Each call is a single attempt; retries are owned by `NotificationService`.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Provider name reported in results and events
    fn name(&self) -> &str;

    fn supports(&self, channel: Channel) -> bool;

    async fn deliver(
        &self,
        notification: &Notification,
        channel: Channel,
    ) -> Result<NotificationResult, ProviderError>;
}

/// Receives lifecycle events from a notification service.
#[async_trait]
pub trait NotificationSubscriber: Send + Sync {
    async fn on_event(&self, event: &LifecycleEvent);
}

/// Attempt count and fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; never below 1
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn of(max_attempts: u32, backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Duration::from_millis(backoff_ms),
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::of(1, 0)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::of(2, 1000)
    }
}

/// Handle to a delivery running on the runtime.
///
/// Resolves to the provider result once all attempts finish. A panic in the
/// delivery task resolves to `NotifyError::Internal`.
#[derive(Debug)]
pub struct PendingDelivery {
    handle: JoinHandle<Result<NotificationResult, NotifyError>>,
}

impl Future for PendingDelivery {
    type Output = Result<NotificationResult, NotifyError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(NotifyError::Internal(format!(
                "delivery task failed: {}",
                e
            )))),
        }
    }
}

/// Per-channel notification service.
///
/// Validates notifications, delivers them through the configured provider with
/// the retry policy, and publishes lifecycle events to every subscriber.
pub struct NotificationService {
    channel: Channel,
    provider: Arc<dyn NotificationProvider>,
    retry_policy: RetryPolicy,
    subscribers: Vec<Arc<dyn NotificationSubscriber>>,
    accepting: AtomicBool,
}

impl NotificationService {
    pub fn builder(
        channel: Channel,
        provider: Arc<dyn NotificationProvider>,
    ) -> NotificationServiceBuilder {
        NotificationServiceBuilder {
            channel,
            provider,
            retry_policy: RetryPolicy::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Stop accepting submissions. Deliveries already running finish normally.
    pub fn shutdown(&self) {
        if self.accepting.swap(false, Ordering::SeqCst) {
            tracing::info!(channel = %self.channel, "Notification service stopped accepting submissions");
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Deliver a notification and wait for the final result.
    ///
    /// Validation errors are returned without publishing any event. Provider
    /// failures publish `Failed` once attempts are exhausted.
    #[tracing::instrument(
        name = "notify.send",
        skip(self, notification),
        fields(notification_id = %notification.id, channel = %self.channel)
    )]
    pub async fn send(&self, notification: Notification) -> Result<NotificationResult, NotifyError> {
        self.ensure_accepting()?;
        self.validate(&notification)?;
        self.deliver_with_retry(notification).await
    }

    /// Submit a notification for background delivery.
    ///
    /// Returns once the delivery is scheduled. Fails synchronously when the
    /// service is shut down or no runtime is available.
    pub fn send_async(
        self: &Arc<Self>,
        notification: Notification,
    ) -> Result<PendingDelivery, NotifyError> {
        self.ensure_accepting()?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| NotifyError::Unavailable(format!("no async runtime: {}", e)))?;

        let service = Arc::clone(self);
        let handle = runtime.spawn(async move { service.send(notification).await });

        Ok(PendingDelivery { handle })
    }

    fn ensure_accepting(&self) -> Result<(), NotifyError> {
        if self.is_accepting() {
            Ok(())
        } else {
            Err(NotifyError::Unavailable(format!(
                "{} service is shut down",
                self.channel
            )))
        }
    }

    fn validate(&self, notification: &Notification) -> Result<(), NotifyError> {
        if notification.message.trim().is_empty() {
            return Err(NotifyError::Validation(
                "notification message must not be empty".to_string(),
            ));
        }

        if !notification.recipient.has_required_field(self.channel) {
            return Err(NotifyError::Validation(format!(
                "missing required field '{}' for {} channel",
                self.channel.required_field(),
                self.channel
            )));
        }

        Ok(())
    }

    async fn deliver_with_retry(
        &self,
        notification: Notification,
    ) -> Result<NotificationResult, NotifyError> {
        let provider = self.provider.name().to_string();
        let max_attempts = self.retry_policy.max_attempts;
        let mut attempt = 1;

        loop {
            ProviderMetrics::record_attempt(self.channel);

            let attempt_result = match self.provider.deliver(&notification, self.channel).await {
                // A negative result is a rejection, never a delivery.
                Ok(result) if !result.success => Err(ProviderError::permanent(
                    result
                        .error_message
                        .unwrap_or_else(|| format!("{} rejected the notification", provider)),
                )),
                other => other,
            };

            match attempt_result {
                Ok(result) => {
                    tracing::debug!(
                        notification_id = %notification.id,
                        provider = %provider,
                        attempt = attempt,
                        "Notification delivered"
                    );
                    self.publish(LifecycleEvent::Sent {
                        notification_id: notification.id,
                        provider,
                        channel: self.channel,
                    })
                    .await;
                    return Ok(result);
                }
                Err(e) if e.retryable && attempt < max_attempts => {
                    tracing::warn!(
                        notification_id = %notification.id,
                        provider = %provider,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        error = %e,
                        "Delivery attempt failed, retrying"
                    );
                    ProviderMetrics::record_retry(self.channel);
                    self.publish(LifecycleEvent::Retrying {
                        notification_id: notification.id,
                        provider: provider.clone(),
                        channel: self.channel,
                        attempt,
                        error_message: e.message.clone(),
                    })
                    .await;

                    tokio::time::sleep(self.retry_policy.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        notification_id = %notification.id,
                        provider = %provider,
                        attempt = attempt,
                        error = %e,
                        "Delivery failed"
                    );
                    self.publish(LifecycleEvent::Failed {
                        notification_id: notification.id,
                        provider: provider.clone(),
                        channel: self.channel,
                        error_message: e.message.clone(),
                    })
                    .await;
                    return Err(NotifyError::Provider {
                        provider,
                        message: e.message,
                    });
                }
            }
        }
    }

    async fn publish(&self, event: LifecycleEvent) {
        let deliveries = self
            .subscribers
            .iter()
            .map(|subscriber| subscriber.on_event(&event));
        futures::future::join_all(deliveries).await;
    }
}

/// Builder for `NotificationService`
pub struct NotificationServiceBuilder {
    channel: Channel,
    provider: Arc<dyn NotificationProvider>,
    retry_policy: RetryPolicy,
    subscribers: Vec<Arc<dyn NotificationSubscriber>>,
}

impl NotificationServiceBuilder {
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn subscriber(mut self, subscriber: Arc<dyn NotificationSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn build(self) -> Result<NotificationService, NotifyError> {
        if !self.provider.supports(self.channel) {
            return Err(NotifyError::UnsupportedChannel {
                provider: self.provider.name().to_string(),
                channel: self.channel,
            });
        }

        Ok(NotificationService {
            channel: self.channel,
            provider: self.provider,
            retry_policy: self.retry_policy,
            subscribers: self.subscribers,
            accepting: AtomicBool::new(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;

    use uuid::Uuid;

    use super::*;
    use crate::provider::{Recipient, DEVICE_TOKEN_KEY};

    /// Fails the first `failures` attempts, then succeeds
    struct FlakyProvider {
        failures: u32,
        retryable: bool,
        calls: AtomicU32,
    }

    impl FlakyProvider {
        fn new(failures: u32, retryable: bool) -> Self {
            Self {
                failures,
                retryable,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl NotificationProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn supports(&self, channel: Channel) -> bool {
            channel == Channel::Sms
        }

        async fn deliver(
            &self,
            notification: &Notification,
            channel: Channel,
        ) -> Result<NotificationResult, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                let message = format!("attempt {} failed", call);
                return Err(if self.retryable {
                    ProviderError::transient(message)
                } else {
                    ProviderError::permanent(message)
                });
            }
            Ok(NotificationResult::success(notification.id, "flaky", channel))
        }
    }

    #[derive(Default)]
    struct CollectingSubscriber {
        events: Mutex<Vec<LifecycleEvent>>,
    }

    impl CollectingSubscriber {
        fn kinds(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|e| e.kind()).collect()
        }
    }

    #[async_trait]
    impl NotificationSubscriber for CollectingSubscriber {
        async fn on_event(&self, event: &LifecycleEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn sms_notification() -> Notification {
        Notification::new(
            Uuid::new_v4(),
            Recipient::new("", "+5411"),
            "Alert: transaction rejected.",
        )
    }

    fn service(
        provider: Arc<FlakyProvider>,
        policy: RetryPolicy,
        subscriber: Arc<CollectingSubscriber>,
    ) -> Arc<NotificationService> {
        Arc::new(
            NotificationService::builder(Channel::Sms, provider)
                .retry_policy(policy)
                .subscriber(subscriber)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_retry_policy_minimum_one_attempt() {
        assert_eq!(RetryPolicy::of(0, 10).max_attempts, 1);
        assert_eq!(RetryPolicy::none().max_attempts, 1);
        assert_eq!(RetryPolicy::default().max_attempts, 2);
    }

    #[test]
    fn test_builder_rejects_unsupported_channel() {
        let provider = Arc::new(FlakyProvider::new(0, true));
        let result = NotificationService::builder(Channel::Email, provider).build();
        assert!(matches!(
            result,
            Err(NotifyError::UnsupportedChannel { channel: Channel::Email, .. })
        ));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let provider = Arc::new(FlakyProvider::new(2, true));
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = service(provider.clone(), RetryPolicy::of(3, 1), subscriber.clone());

        let result = service.send(sms_notification()).await;
        assert!(result.is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(subscriber.kinds(), vec!["retrying", "retrying", "sent"]);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_publish_failed() {
        let provider = Arc::new(FlakyProvider::new(10, true));
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = service(provider.clone(), RetryPolicy::of(2, 1), subscriber.clone());

        let err = service.send(sms_notification()).await.unwrap_err();
        assert_eq!(
            err,
            NotifyError::Provider {
                provider: "flaky".to_string(),
                message: "attempt 2 failed".to_string(),
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(subscriber.kinds(), vec!["retrying", "failed"]);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let provider = Arc::new(FlakyProvider::new(10, false));
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = service(provider.clone(), RetryPolicy::of(5, 1), subscriber.clone());

        assert!(service.send(sms_notification()).await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(subscriber.kinds(), vec!["failed"]);
    }

    /// Answers every attempt with a negative result instead of an error
    struct NegativeResultProvider {
        message: Option<&'static str>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl NotificationProvider for NegativeResultProvider {
        fn name(&self) -> &str {
            "negative"
        }

        fn supports(&self, channel: Channel) -> bool {
            channel == Channel::Sms
        }

        async fn deliver(
            &self,
            notification: &Notification,
            channel: Channel,
        ) -> Result<NotificationResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut result = NotificationResult::failure(notification.id, "negative", channel, "");
            result.error_message = self.message.map(str::to_string);
            Ok(result)
        }
    }

    #[tokio::test]
    async fn test_negative_result_publishes_failed() {
        let provider = Arc::new(NegativeResultProvider {
            message: Some("X"),
            calls: AtomicU32::new(0),
        });
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = NotificationService::builder(Channel::Sms, provider.clone())
            .retry_policy(RetryPolicy::of(3, 1))
            .subscriber(subscriber.clone())
            .build()
            .unwrap();

        let err = service.send(sms_notification()).await.unwrap_err();
        assert_eq!(
            err,
            NotifyError::Provider {
                provider: "negative".to_string(),
                message: "X".to_string(),
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(subscriber.kinds(), vec!["failed"]);

        let events = subscriber.events.lock().unwrap();
        assert!(matches!(
            &events[0],
            LifecycleEvent::Failed { error_message, .. } if error_message == "X"
        ));
    }

    #[tokio::test]
    async fn test_negative_result_without_message_names_provider() {
        let provider = Arc::new(NegativeResultProvider {
            message: None,
            calls: AtomicU32::new(0),
        });
        let service = NotificationService::builder(Channel::Sms, provider)
            .retry_policy(RetryPolicy::none())
            .build()
            .unwrap();

        let err = service.send(sms_notification()).await.unwrap_err();
        assert!(matches!(
            err,
            NotifyError::Provider { ref message, .. } if message == "negative rejected the notification"
        ));
    }

    #[tokio::test]
    async fn test_validation_error_publishes_nothing() {
        let provider = Arc::new(FlakyProvider::new(0, true));
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = service(provider.clone(), RetryPolicy::none(), subscriber.clone());

        let notification = Notification::new(
            Uuid::new_v4(),
            Recipient::new("a@example.com", "").with_metadata(DEVICE_TOKEN_KEY, "tok"),
            "hello",
        );
        let err = service.send(notification).await.unwrap_err();

        assert!(matches!(err, NotifyError::Validation(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(subscriber.kinds().is_empty());
    }

    #[tokio::test]
    async fn test_send_async_resolves_in_background() {
        let provider = Arc::new(FlakyProvider::new(0, true));
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = service(provider, RetryPolicy::none(), subscriber.clone());

        let notification = sms_notification();
        let id = notification.id;
        let pending = service.send_async(notification).unwrap();

        let result = pending.await.unwrap();
        assert_eq!(result.notification_id, id);
        assert_eq!(subscriber.kinds(), vec!["sent"]);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_submissions() {
        let provider = Arc::new(FlakyProvider::new(0, true));
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = service(provider, RetryPolicy::none(), subscriber);

        service.shutdown();
        assert!(!service.is_accepting());
        assert!(matches!(
            service.send_async(sms_notification()),
            Err(NotifyError::Unavailable(_))
        ));
    }

    #[test]
    fn test_send_async_without_runtime_fails_synchronously() {
        let provider = Arc::new(FlakyProvider::new(0, true));
        let subscriber = Arc::new(CollectingSubscriber::default());
        let service = service(provider, RetryPolicy::none(), subscriber);

        assert!(matches!(
            service.send_async(sms_notification()),
            Err(NotifyError::Unavailable(_))
        ));
    }
}
