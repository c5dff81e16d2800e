use std::sync::Arc;

use serde::Serialize;

use crate::domain::{select_channel, Channel, NotificationOutcome, Transaction};
use crate::notification::NotificationDispatcher;
use crate::provider::NotifyError;

/// Outcome of processing a single transaction
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub transaction: Transaction,
    /// Channel the notification went out on
    pub channel: Channel,
    pub outcome: NotificationOutcome,
}

/// Synchronous single-transaction flow
#[derive(Clone)]
pub struct TransactionProcessor {
    dispatcher: Arc<NotificationDispatcher>,
}

impl TransactionProcessor {
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Notify the customer over the channel matching the business status.
    ///
    /// Provider and validation errors are returned as-is; nothing is retried
    /// here beyond the provider's own retry policy.
    #[tracing::instrument(
        name = "processing.process",
        skip(self, transaction),
        fields(transaction_id = %transaction.id, status = %transaction.status)
    )]
    pub async fn process(&self, transaction: Transaction) -> Result<ProcessingResult, NotifyError> {
        let channel = select_channel(transaction.status);
        let message = transaction.status.message();

        let outcome = self
            .dispatcher
            .send_sync(channel, &transaction, message)
            .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            channel = %channel,
            success = outcome.success,
            "Transaction processed"
        );

        Ok(ProcessingResult {
            transaction,
            channel,
            outcome,
        })
    }
}
