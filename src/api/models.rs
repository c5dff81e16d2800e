//! Request and response bodies for the transaction endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    BusinessStatus, Channel, DeliveryStatus, DeliveryStatusRecord, NotificationOutcome,
    Transaction,
};
use crate::error::AppError;
use crate::processing::ProcessingResult;

/// Incoming transaction. The ID is generated when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub amount: f64,
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub device_token: Option<String>,
    pub status: BusinessStatus,
}

impl TransactionRequest {
    pub fn into_transaction(self) -> Result<Transaction, AppError> {
        if !self.amount.is_finite() {
            return Err(AppError::Validation("amount must be a finite number".to_string()));
        }
        if self.customer_name.trim().is_empty() {
            return Err(AppError::Validation("customerName is required".to_string()));
        }

        let mut builder = Transaction::builder(self.status)
            .maybe_id(self.id)
            .amount(self.amount)
            .customer_name(self.customer_name)
            .email(self.email)
            .phone(self.phone);
        if let Some(token) = self.device_token {
            builder = builder.device_token(token);
        }

        Ok(builder.build())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummary {
    pub channel: Channel,
    pub success: bool,
    pub message_id: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl NotificationSummary {
    fn new(channel: Channel, outcome: NotificationOutcome) -> Self {
        Self {
            channel,
            success: outcome.success,
            message_id: outcome.message_id,
            provider: outcome.provider,
            error_message: outcome.error_message,
        }
    }
}

/// Response for a synchronously processed transaction
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub status: BusinessStatus,
    pub amount: f64,
    pub customer_name: String,
    pub notification: NotificationSummary,
}

impl From<ProcessingResult> for TransactionResponse {
    fn from(result: ProcessingResult) -> Self {
        let ProcessingResult {
            transaction,
            channel,
            outcome,
        } = result;

        Self {
            id: transaction.id,
            status: transaction.status,
            amount: transaction.amount,
            customer_name: transaction.customer_name,
            notification: NotificationSummary::new(channel, outcome),
        }
    }
}

/// Response for an accepted batch
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAcceptedResponse {
    pub accepted: usize,
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeliveryStatusRecord> for StatusResponse {
    fn from(record: DeliveryStatusRecord) -> Self {
        let (provider, error_message) = match record.outcome {
            Some(outcome) => (Some(outcome.provider), outcome.error_message),
            None => (None, None),
        };

        Self {
            id: record.id,
            status: record.status,
            provider,
            error_message,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_without_id_gets_generated_id() {
        let request: TransactionRequest = serde_json::from_value(serde_json::json!({
            "amount": 120.5,
            "customerName": "Ana",
            "email": "ana@example.com",
            "status": "COMPLETED"
        }))
        .unwrap();

        let transaction = request.into_transaction().unwrap();
        assert_eq!(transaction.status, BusinessStatus::Completed);
        assert_eq!(transaction.email, "ana@example.com");
        assert!(transaction.phone.is_empty());
        assert_ne!(transaction.id, Uuid::nil());
    }

    #[test]
    fn test_request_keeps_explicit_id() {
        let id = Uuid::new_v4();
        let request: TransactionRequest = serde_json::from_value(serde_json::json!({
            "id": id,
            "amount": 1.0,
            "customerName": "Bo",
            "deviceToken": "tok-1",
            "status": "PENDING"
        }))
        .unwrap();

        let transaction = request.into_transaction().unwrap();
        assert_eq!(transaction.id, id);
        assert_eq!(transaction.device_token(), Some("tok-1"));
    }

    #[test]
    fn test_blank_customer_is_rejected() {
        let request: TransactionRequest = serde_json::from_value(serde_json::json!({
            "amount": 1.0,
            "customerName": " ",
            "status": "REJECTED"
        }))
        .unwrap();

        assert!(matches!(
            request.into_transaction(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_status_response_from_failed_record() {
        let id = Uuid::new_v4();
        let record = DeliveryStatusRecord::failed(
            id,
            NotificationOutcome::failure(id.to_string(), "firebase", "X"),
        );

        let response = StatusResponse::from(record);
        assert_eq!(response.status, DeliveryStatus::Failed);
        assert_eq!(response.error_message.as_deref(), Some("X"));
        assert_eq!(response.provider.as_deref(), Some("firebase"));
    }
}
