use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business state of a transaction, as reported by the caller.
///
/// This is an input classification used for channel selection. It is unrelated
/// to the delivery tracking state kept in the status store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    Completed,
    Pending,
    Rejected,
}

impl BusinessStatus {
    /// Customer-facing message sent for this status
    pub fn message(&self) -> &'static str {
        match self {
            BusinessStatus::Completed => "Payment successful!",
            BusinessStatus::Pending => "Your payment is being processed.",
            BusinessStatus::Rejected => "Alert: transaction rejected.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessStatus::Completed => "COMPLETED",
            BusinessStatus::Pending => "PENDING",
            BusinessStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A financial transaction to notify the customer about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID, also used as the notification ID
    pub id: Uuid,
    /// Transaction amount
    pub amount: f64,
    /// Customer full name
    pub customer_name: String,
    /// Customer email address
    pub email: String,
    /// Customer phone number
    pub phone: String,
    /// Device token for push notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    /// Business status of the transaction
    pub status: BusinessStatus,
}

impl Transaction {
    /// Create a builder for a transaction with the given business status
    pub fn builder(status: BusinessStatus) -> TransactionBuilder {
        TransactionBuilder::new(status)
    }

    /// Device token, if present and not blank
    pub fn device_token(&self) -> Option<&str> {
        self.device_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Message for the batch (fire-and-forget) path
    pub fn processing_message(&self) -> String {
        format!("Transaction {} PROCESSING", self.id)
    }
}

/// Builder for transactions.
///
/// A system-assigned ID is generated unless one is supplied.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    id: Option<Uuid>,
    amount: f64,
    customer_name: String,
    email: String,
    phone: String,
    device_token: Option<String>,
    status: BusinessStatus,
}

impl TransactionBuilder {
    pub fn new(status: BusinessStatus) -> Self {
        Self {
            id: None,
            amount: 0.0,
            customer_name: String::new(),
            email: String::new(),
            phone: String::new(),
            device_token: None,
            status,
        }
    }

    /// Use a caller-assigned ID
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Use the given ID if present, otherwise keep the generated one
    pub fn maybe_id(mut self, id: Option<Uuid>) -> Self {
        self.id = id.or(self.id);
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn device_token(mut self, token: impl Into<String>) -> Self {
        self.device_token = Some(token.into());
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            amount: self.amount,
            customer_name: self.customer_name,
            email: self.email,
            phone: self.phone,
            device_token: self.device_token,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assigns_id_when_missing() {
        let a = Transaction::builder(BusinessStatus::Pending).build();
        let b = Transaction::builder(BusinessStatus::Pending).build();
        assert_ne!(a.id, b.id);

        let id = Uuid::new_v4();
        let c = Transaction::builder(BusinessStatus::Pending).id(id).build();
        assert_eq!(c.id, id);

        let d = Transaction::builder(BusinessStatus::Pending)
            .maybe_id(None)
            .build();
        assert!(!d.id.is_nil());
    }

    #[test]
    fn test_blank_device_token_is_absent() {
        let tx = Transaction::builder(BusinessStatus::Pending)
            .device_token("   ")
            .build();
        assert_eq!(tx.device_token(), None);

        let tx = Transaction::builder(BusinessStatus::Pending)
            .device_token("tok-123")
            .build();
        assert_eq!(tx.device_token(), Some("tok-123"));
    }

    #[test]
    fn test_business_status_serde() {
        let json = serde_json::to_string(&BusinessStatus::Rejected).unwrap();
        assert_eq!(json, "\"REJECTED\"");
        let parsed: BusinessStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, BusinessStatus::Pending);
    }
}
