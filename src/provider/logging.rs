//! Provider that logs notifications instead of delivering them.

use async_trait::async_trait;

use crate::domain::Channel;

use super::service::NotificationProvider;
use super::types::{Notification, NotificationResult, ProviderError};

/// Logs each notification and reports it as delivered.
///
/// Stands in for a real gateway (SMTP relay, SMS API, push service) in
/// development deployments.
#[derive(Debug, Clone)]
pub struct LoggingProvider {
    name: String,
    channel: Channel,
}

impl LoggingProvider {
    pub fn new(name: impl Into<String>, channel: Channel) -> Self {
        Self {
            name: name.into(),
            channel,
        }
    }
}

#[async_trait]
impl NotificationProvider for LoggingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, channel: Channel) -> bool {
        channel == self.channel
    }

    async fn deliver(
        &self,
        notification: &Notification,
        channel: Channel,
    ) -> Result<NotificationResult, ProviderError> {
        tracing::info!(
            provider = %self.name,
            channel = %channel,
            notification_id = %notification.id,
            message = %notification.message,
            "Sending notification"
        );
        Ok(NotificationResult::success(notification.id, &self.name, channel))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::provider::Recipient;

    #[tokio::test]
    async fn test_logging_provider_succeeds() {
        let provider = LoggingProvider::new("twilio", Channel::Sms);
        assert!(provider.supports(Channel::Sms));
        assert!(!provider.supports(Channel::Push));

        let notification = Notification::new(Uuid::new_v4(), Recipient::new("", "+1"), "hi");
        let result = provider.deliver(&notification, Channel::Sms).await.unwrap();
        assert!(result.success);
        assert_eq!(result.provider_name, "twilio");
        assert_eq!(result.notification_id, notification.id);
    }
}
