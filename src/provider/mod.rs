//! Notification provider layer.
//!
//! Each channel is served by a `NotificationService` that wraps a transport
//! (`NotificationProvider`), applies validation and the retry policy, and
//! publishes `LifecycleEvent`s to its subscribers:
//!
//! - `Sent` when the transport accepts the notification
//! - `Retrying` between attempts
//! - `Failed` once attempts are exhausted or a permanent error occurs
//!
//! Validation failures are returned to the caller and publish no event.

mod logging;
mod service;
mod types;

pub use logging::LoggingProvider;
pub use service::{
    NotificationProvider, NotificationService, NotificationServiceBuilder,
    NotificationSubscriber, PendingDelivery, RetryPolicy,
};
pub use types::{
    LifecycleEvent, Notification, NotificationResult, NotifyError, ProviderError, Recipient,
    CUSTOMER_ID_KEY, DEVICE_TOKEN_KEY,
};
