use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::domain::Channel;
use crate::error::AppError;
use crate::notification::{NotificationDispatcher, TransactionAuditListener};
use crate::processing::{BatchProcessor, TransactionProcessor};
use crate::provider::{
    LoggingProvider, NotificationProvider, NotificationService, NotificationSubscriber,
    RetryPolicy,
};
use crate::store::{create_status_store, StatusStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn StatusStore>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub processor: TransactionProcessor,
    pub batch_processor: BatchProcessor,
    pub start_time: Instant,
}

impl AppState {
    /// Build the full service graph with a logging provider per channel.
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let providers = Channel::ALL
            .into_iter()
            .map(|channel| {
                let name = settings.notify.provider_name(channel);
                let provider: Arc<dyn NotificationProvider> =
                    Arc::new(LoggingProvider::new(name, channel));
                (channel, provider)
            })
            .collect();

        Self::with_providers(settings, providers)
    }

    /// Build the service graph around the given providers.
    ///
    /// Channels without a provider are left unconfigured; sends over them
    /// fail with `NotifyError::Unavailable`.
    pub fn with_providers(
        settings: Settings,
        providers: Vec<(Channel, Arc<dyn NotificationProvider>)>,
    ) -> Result<Self, AppError> {
        let store = create_status_store(&settings.store);
        let listener: Arc<dyn NotificationSubscriber> =
            Arc::new(TransactionAuditListener::new(store.clone()));
        let retry_policy = RetryPolicy::of(
            settings.notify.retry_attempts,
            settings.notify.retry_backoff_ms,
        );

        let services = providers
            .into_iter()
            .map(|(channel, provider)| {
                NotificationService::builder(channel, provider)
                    .retry_policy(retry_policy)
                    .subscriber(listener.clone())
                    .build()
                    .map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dispatcher = Arc::new(NotificationDispatcher::new(services, store.clone()));
        let processor = TransactionProcessor::new(dispatcher.clone());
        let batch_processor = BatchProcessor::with_channel_mode(
            dispatcher.clone(),
            store.clone(),
            settings.batch.channel_mode,
        );

        tracing::info!(
            store_backend = store.backend_type(),
            channels = ?dispatcher.channels(),
            retry_attempts = retry_policy.max_attempts,
            batch_channel_mode = ?settings.batch.channel_mode,
            "Notification pipeline initialized"
        );

        Ok(Self {
            settings: Arc::new(settings),
            store,
            dispatcher,
            processor,
            batch_processor,
            start_time: Instant::now(),
        })
    }
}
