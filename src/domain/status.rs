use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery tracking state of a transaction's notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Dispatched, waiting for the provider outcome
    Processing,
    /// Provider reported delivery
    Completed,
    /// Provider reported failure, or submission failed locally
    Failed,
}

impl DeliveryStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Completed | DeliveryStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Processing => "PROCESSING",
            DeliveryStatus::Completed => "COMPLETED",
            DeliveryStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single send attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub success: bool,
    /// Provider-assigned message ID
    pub message_id: String,
    /// Name of the provider that handled the send
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl NotificationOutcome {
    pub fn success(message_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: message_id.into(),
            provider: provider.into(),
            error_message: None,
        }
    }

    pub fn failure(
        message_id: impl Into<String>,
        provider: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message_id: message_id.into(),
            provider: provider.into(),
            error_message: Some(error_message.into()),
        }
    }
}

/// Latest known delivery state for a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStatusRecord {
    /// Transaction ID
    pub id: Uuid,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<NotificationOutcome>,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryStatusRecord {
    /// Record written when a send is initiated
    pub fn processing(id: Uuid) -> Self {
        Self {
            id,
            status: DeliveryStatus::Processing,
            outcome: None,
            updated_at: Utc::now(),
        }
    }

    pub fn completed(id: Uuid, outcome: NotificationOutcome) -> Self {
        Self {
            id,
            status: DeliveryStatus::Completed,
            outcome: Some(outcome),
            updated_at: Utc::now(),
        }
    }

    pub fn failed(id: Uuid, outcome: NotificationOutcome) -> Self {
        Self {
            id,
            status: DeliveryStatus::Failed,
            outcome: Some(outcome),
            updated_at: Utc::now(),
        }
    }

    /// Error message of the recorded outcome, if any
    pub fn error_message(&self) -> Option<&str> {
        self.outcome
            .as_ref()
            .and_then(|outcome| outcome.error_message.as_deref())
    }
}
