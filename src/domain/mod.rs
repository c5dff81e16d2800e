//! Domain model for transaction notifications.
//!
//! - `transaction`: the immutable transaction value and its business status
//! - `channel`: delivery channels and the channel selection policy
//! - `status`: delivery tracking records written to the status store

mod channel;
mod status;
mod transaction;

pub use channel::{select_channel, Channel};
pub use status::{DeliveryStatus, DeliveryStatusRecord, NotificationOutcome};
pub use transaction::{BusinessStatus, Transaction, TransactionBuilder};
