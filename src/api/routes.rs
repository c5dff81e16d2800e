use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::{health, stats};
use super::metrics::prometheus_metrics;
use super::transactions::{get_status, process_batch, process_transaction};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health, stats & metrics
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Transaction endpoints
        .nest(
            "/v1",
            Router::new()
                .route("/transactions", post(process_transaction))
                .route("/transactions/batch", post(process_batch))
                .route("/transactions/status/{id}", get(get_status)),
        )
}
