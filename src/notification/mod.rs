//! Notification dispatching and delivery status tracking.
//!
//! - `ChannelAdapter`: synchronous and fire-and-forget sends for one channel
//! - `NotificationDispatcher`: one adapter per configured channel
//! - `TransactionAuditListener`: writes terminal statuses from provider events

mod audit;
mod dispatcher;

pub use audit::TransactionAuditListener;
pub use dispatcher::{
    ChannelAdapter, DispatchHandle, DispatcherStats, DispatcherStatsSnapshot,
    NotificationDispatcher,
};
