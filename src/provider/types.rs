use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Channel;

/// Metadata key holding the push device token
pub const DEVICE_TOKEN_KEY: &str = "deviceToken";

/// Metadata key holding the customer identifier
pub const CUSTOMER_ID_KEY: &str = "customerId";

/// Contact details a provider delivers to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    pub phone: String,
    /// Channel-specific extras (device token, customer id, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Non-blank metadata value
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether the field a channel requires is present and not blank
    pub fn has_required_field(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => !self.email.trim().is_empty(),
            Channel::Sms => !self.phone.trim().is_empty(),
            Channel::Push => self.metadata_value(DEVICE_TOKEN_KEY).is_some(),
        }
    }
}

/// A message handed to a notification provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID; lifecycle events carry it back to subscribers
    pub id: Uuid,
    pub recipient: Recipient,
    pub message: String,
}

impl Notification {
    /// Create a notification with an explicit ID
    pub fn new(id: Uuid, recipient: Recipient, message: impl Into<String>) -> Self {
        Self {
            id,
            recipient,
            message: message.into(),
        }
    }
}

/// Provider response for a delivered notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResult {
    pub notification_id: Uuid,
    pub provider_name: String,
    pub channel: Channel,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NotificationResult {
    pub fn success(notification_id: Uuid, provider_name: impl Into<String>, channel: Channel) -> Self {
        Self {
            notification_id,
            provider_name: provider_name.into(),
            channel,
            success: true,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(
        notification_id: Uuid,
        provider_name: impl Into<String>,
        channel: Channel,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            notification_id,
            provider_name: provider_name.into(),
            channel,
            success: false,
            error_message: Some(error_message.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Lifecycle events published to subscribers of a notification service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The provider accepted the notification
    Sent {
        notification_id: Uuid,
        provider: String,
        channel: Channel,
    },
    /// The provider gave up on the notification
    Failed {
        notification_id: Uuid,
        provider: String,
        channel: Channel,
        error_message: String,
    },
    /// An attempt failed and another one is scheduled
    Retrying {
        notification_id: Uuid,
        provider: String,
        channel: Channel,
        attempt: u32,
        error_message: String,
    },
}

impl LifecycleEvent {
    pub fn notification_id(&self) -> Uuid {
        match self {
            LifecycleEvent::Sent { notification_id, .. }
            | LifecycleEvent::Failed { notification_id, .. }
            | LifecycleEvent::Retrying { notification_id, .. } => *notification_id,
        }
    }

    /// Short name used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleEvent::Sent { .. } => "sent",
            LifecycleEvent::Failed { .. } => "failed",
            LifecycleEvent::Retrying { .. } => "retrying",
        }
    }
}

/// Error returned by a provider transport for a single attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
    /// Whether another attempt may succeed
    pub retryable: bool,
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

/// Errors surfaced by a notification service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// Malformed notification or missing channel-required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider rejected or failed to deliver after all attempts
    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    /// Provider cannot deliver over the requested channel
    #[error("Provider {provider} does not support channel {channel}")]
    UnsupportedChannel { provider: String, channel: Channel },

    /// Service is not accepting submissions
    #[error("Notification service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotifyError {
    /// Whether a `Failed` lifecycle event was published for this error.
    ///
    /// Only provider failures go through the event stream; every other error
    /// is raised before the provider is involved.
    pub fn is_reported(&self) -> bool {
        matches!(self, NotifyError::Provider { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let recipient = Recipient::new("a@example.com", "");
        assert!(recipient.has_required_field(Channel::Email));
        assert!(!recipient.has_required_field(Channel::Sms));
        assert!(!recipient.has_required_field(Channel::Push));

        let recipient = recipient.with_metadata(DEVICE_TOKEN_KEY, "  ");
        assert!(!recipient.has_required_field(Channel::Push));

        let recipient = recipient.with_metadata(DEVICE_TOKEN_KEY, "tok");
        assert!(recipient.has_required_field(Channel::Push));
    }

    #[test]
    fn test_event_accessors() {
        let id = Uuid::new_v4();
        let event = LifecycleEvent::Failed {
            notification_id: id,
            provider: "twilio".to_string(),
            channel: Channel::Sms,
            error_message: "boom".to_string(),
        };
        assert_eq!(event.notification_id(), id);
        assert_eq!(event.kind(), "failed");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["channel"], "SMS");
    }

    #[test]
    fn test_only_provider_errors_are_reported() {
        let provider = NotifyError::Provider {
            provider: "firebase".to_string(),
            message: "X".to_string(),
        };
        assert!(provider.is_reported());
        assert!(!NotifyError::Validation("missing".to_string()).is_reported());
        assert!(!NotifyError::Internal("panic".to_string()).is_reported());
        assert!(!NotifyError::Unavailable("closed".to_string()).is_reported());
    }
}
