//! In-memory status store using DashMap.
//!
//! Records live in memory and are lost on restart. Nothing is ever evicted.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::DeliveryStatusRecord;

use super::{SaveOutcome, StatusStore, StoreError, WritePolicy};

/// In-memory status store.
///
/// Uses `DashMap` so each write holds only the shard lock for its key.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    records: DashMap<Uuid, DeliveryStatusRecord>,
    policy: WritePolicy,
}

impl MemoryStatusStore {
    /// Create a last-write-wins store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: WritePolicy) -> Self {
        Self {
            records: DashMap::new(),
            policy,
        }
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn save(&self, record: DeliveryStatusRecord) -> Result<SaveOutcome, StoreError> {
        let id = record.id;
        let status = record.status;

        let outcome = match self.policy {
            WritePolicy::LastWriteWins => {
                self.records.insert(id, record);
                SaveOutcome::Written
            }
            WritePolicy::StickyTerminal => match self.records.entry(id) {
                Entry::Occupied(mut existing) => {
                    if existing.get().status.is_terminal() {
                        tracing::debug!(
                            transaction_id = %id,
                            kept = %existing.get().status,
                            discarded = %status,
                            "Discarding write to terminal record"
                        );
                        SaveOutcome::TerminalKept
                    } else {
                        existing.insert(record);
                        SaveOutcome::Written
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                    SaveOutcome::Written
                }
            },
        };

        if outcome == SaveOutcome::Written {
            tracing::trace!(transaction_id = %id, status = %status, "Status record saved");
        }

        Ok(outcome)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryStatusRecord>, StoreError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn record_count(&self) -> usize {
        self.records.len()
    }

    fn write_policy(&self) -> WritePolicy {
        self.policy
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
