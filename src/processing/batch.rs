use std::sync::Arc;

use uuid::Uuid;

use crate::config::BatchChannelMode;
use crate::domain::{select_channel, Channel, DeliveryStatusRecord, Transaction};
use crate::notification::NotificationDispatcher;
use crate::store::StatusStore;
use crate::telemetry::{annotate_current_span, attributes};

/// Fire-and-forget batch flow
#[derive(Clone)]
pub struct BatchProcessor {
    dispatcher: Arc<NotificationDispatcher>,
    store: Arc<dyn StatusStore>,
    channel_mode: BatchChannelMode,
}

impl BatchProcessor {
    /// Create a batch processor that sends every item over push
    pub fn new(dispatcher: Arc<NotificationDispatcher>, store: Arc<dyn StatusStore>) -> Self {
        Self::with_channel_mode(dispatcher, store, BatchChannelMode::Push)
    }

    pub fn with_channel_mode(
        dispatcher: Arc<NotificationDispatcher>,
        store: Arc<dyn StatusStore>,
        channel_mode: BatchChannelMode,
    ) -> Self {
        Self {
            dispatcher,
            store,
            channel_mode,
        }
    }

    /// Dispatch every transaction and return their IDs in input order.
    ///
    /// Each item is marked PROCESSING before it is submitted. The call returns
    /// without waiting for any delivery; per-item failures end up as FAILED
    /// records and never abort the batch.
    #[tracing::instrument(
        name = "processing.process_batch",
        skip(self, transactions),
        fields(batch_size = transactions.len())
    )]
    pub async fn process_batch(&self, transactions: Vec<Transaction>) -> Vec<Uuid> {
        annotate_current_span([attributes::batch_size(transactions.len())]);
        let mut ids = Vec::with_capacity(transactions.len());

        for transaction in &transactions {
            let id = transaction.id;

            if let Err(e) = self.store.save(DeliveryStatusRecord::processing(id)).await {
                tracing::error!(
                    transaction_id = %id,
                    error = %e,
                    "Failed to record PROCESSING status"
                );
            }

            let channel = self.channel_for(transaction);
            let message = transaction.processing_message();
            // Dropping the handle detaches the delivery.
            let _ = self
                .dispatcher
                .send_async(channel, transaction, &message)
                .await;

            ids.push(id);
        }

        tracing::info!(batch_size = ids.len(), "Batch dispatched");
        ids
    }

    fn channel_for(&self, transaction: &Transaction) -> Channel {
        match self.channel_mode {
            BatchChannelMode::Push => Channel::Push,
            BatchChannelMode::Policy => select_channel(transaction.status),
        }
    }
}
