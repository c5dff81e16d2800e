//! API layer - HTTP endpoint handlers.

mod health;
mod metrics;
mod models;
mod routes;
mod transactions;

pub use health::{health, stats, HealthResponse, StatsResponse};
pub use metrics::prometheus_metrics;
pub use models::{
    BatchAcceptedResponse, NotificationSummary, StatusResponse, TransactionRequest,
    TransactionResponse,
};
pub use routes::api_routes;
pub use transactions::{get_status, process_batch, process_transaction};
