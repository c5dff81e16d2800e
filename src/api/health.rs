//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::BatchChannelMode;
use crate::domain::Channel;
use crate::notification::DispatcherStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreHealthResponse,
    pub batch_channel_mode: BatchChannelMode,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Serialize)]
pub struct StoreHealthResponse {
    pub backend: String,
    pub records: usize,
    pub sticky_terminal_states: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub dispatcher: DispatcherStatsSnapshot,
    pub status_records: usize,
    pub channels: Vec<ChannelStats>,
}

/// Per-channel view of a notification service
#[derive(Debug, Serialize)]
pub struct ChannelStats {
    pub channel: Channel,
    pub provider: String,
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub subscribers: usize,
    pub accepting: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let channels = state.dispatcher.channels();
    let status = if channels.len() == Channel::ALL.len() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        store: StoreHealthResponse {
            backend: state.store.backend_type().to_string(),
            records: state.store.record_count().await,
            sticky_terminal_states: state.settings.store.sticky_terminal_states,
        },
        batch_channel_mode: state.settings.batch.channel_mode,
        channels,
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let channels = state
        .dispatcher
        .channels()
        .into_iter()
        .filter_map(|channel| state.dispatcher.adapter(channel).ok())
        .map(|adapter| {
            let service = adapter.service();
            let retry = service.retry_policy();
            ChannelStats {
                channel: adapter.channel(),
                provider: service.provider_name().to_string(),
                max_attempts: retry.max_attempts,
                backoff_ms: retry.backoff.as_millis() as u64,
                subscribers: service.subscriber_count(),
                accepting: service.is_accepting(),
            }
        })
        .collect();

    Json(StatsResponse {
        dispatcher: state.dispatcher.stats(),
        status_records: state.store.record_count().await,
        channels,
    })
}
