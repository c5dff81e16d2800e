// Domain layer
pub mod domain;

// Infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;

// Notification pipeline
pub mod notification;
pub mod processing;
pub mod provider;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod telemetry;
