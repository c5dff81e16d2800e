//! Delivery status storage.
//!
//! The status store maps a transaction ID to its latest `DeliveryStatusRecord`.
//! Every writer (batch orchestrator, dispatcher fallback, audit listener) treats
//! `save` as an independent upsert; there is no coordination across writers and
//! no transaction spanning several IDs.
//!
//! Backends:
//!
//! - `MemoryStatusStore`: in-memory storage using DashMap (default)
//!
//! Use `create_status_store()` to build the backend named in configuration.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::domain::DeliveryStatusRecord;

pub use memory::MemoryStatusStore;

/// Errors that can occur during status store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend is temporarily unavailable
    #[error("Status store unavailable: {0}")]
    Unavailable(String),
}

/// How a store resolves a write to an ID that already has a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Unconditional upsert; the most recent writer wins
    #[default]
    LastWriteWins,
    /// Once an ID is COMPLETED or FAILED, later writes for it are discarded
    StickyTerminal,
}

/// Result of a `save` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was stored
    Written,
    /// The existing terminal record was kept and the write discarded
    TerminalKept,
}

/// Backend trait for delivery status storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and safe under any number of
/// concurrent writers. Each `save` for a given ID is atomic with respect to
/// other writers of the same ID; no ordering is enforced between writers.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Upsert the record for `record.id`.
    async fn save(&self, record: DeliveryStatusRecord) -> Result<SaveOutcome, StoreError>;

    /// Look up the latest record for a transaction.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryStatusRecord>, StoreError>;

    /// Number of tracked transactions.
    async fn record_count(&self) -> usize;

    /// Write policy this store applies.
    fn write_policy(&self) -> WritePolicy;

    /// Backend type identifier
    fn backend_type(&self) -> &'static str;
}

/// Create a status store based on configuration.
///
/// - `"memory"` (default): Returns a `MemoryStatusStore`
///
/// Unknown backend names fall back to memory with a warning.
pub fn create_status_store(settings: &StoreConfig) -> Arc<dyn StatusStore> {
    let policy = if settings.sticky_terminal_states {
        WritePolicy::StickyTerminal
    } else {
        WritePolicy::LastWriteWins
    };

    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", policy = ?policy, "Creating memory status store");
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown status store backend requested, falling back to memory"
            );
        }
    }

    Arc::new(MemoryStatusStore::with_policy(policy))
}

/// Backend that rejects every operation, for exercising store error paths.
#[cfg(test)]
pub(crate) struct UnavailableStatusStore;

#[cfg(test)]
#[async_trait]
impl StatusStore for UnavailableStatusStore {
    async fn save(&self, _record: DeliveryStatusRecord) -> Result<SaveOutcome, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<DeliveryStatusRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn record_count(&self) -> usize {
        0
    }

    fn write_policy(&self) -> WritePolicy {
        WritePolicy::LastWriteWins
    }

    fn backend_type(&self) -> &'static str {
        "unavailable"
    }
}
