//! Transaction processing flows.
//!
//! - `TransactionProcessor`: one transaction, channel chosen by business
//!   status, caller waits for the provider outcome
//! - `BatchProcessor`: many transactions, fire-and-forget, outcomes tracked
//!   in the status store

mod batch;
mod single;

pub use batch::BatchProcessor;
pub use single::{ProcessingResult, TransactionProcessor};
