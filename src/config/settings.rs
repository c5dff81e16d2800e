use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::domain::Channel;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Provider settings shared by every channel
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Total delivery attempts per notification (including the first)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_email_provider")]
    pub email_provider: String,
    #[serde(default = "default_sms_provider")]
    pub sms_provider: String,
    #[serde(default = "default_push_provider")]
    pub push_provider: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Storage backend: "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,
    /// Reject writes for IDs that already reached COMPLETED or FAILED
    #[serde(default)]
    pub sticky_terminal_states: bool,
}

/// How batch items pick their delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchChannelMode {
    /// Every batch item goes out over push
    #[default]
    Push,
    /// Each item uses the channel selection policy
    Policy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub channel_mode: BatchChannelMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Trace sampling ratio (0.0 - 1.0)
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_email_provider() -> String {
    "smtp-relay".to_string()
}

fn default_sms_provider() -> String {
    "twilio".to_string()
}

fn default_push_provider() -> String {
    "firebase".to_string()
}

fn default_store_backend() -> String {
    "memory".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("notify.retry_attempts", default_retry_attempts() as i64)?
            .set_default("notify.retry_backoff_ms", default_retry_backoff_ms() as i64)?
            .set_default("store.backend", default_store_backend())?
            .set_default("batch.channel_mode", "push")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // GATEWAY__SERVER__PORT, GATEWAY__NOTIFY__RETRY_ATTEMPTS, ...
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl NotifyConfig {
    /// Provider name configured for a channel
    pub fn provider_name(&self, channel: Channel) -> &str {
        match channel {
            Channel::Email => &self.email_provider,
            Channel::Sms => &self.sms_provider,
            Channel::Push => &self.push_provider,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            email_provider: default_email_provider(),
            sms_provider: default_sms_provider(),
            push_provider: default_push_provider(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            sticky_terminal_states: false,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.notify.retry_attempts, 2);
        assert_eq!(settings.notify.retry_backoff_ms, 1000);
        assert_eq!(settings.store.backend, "memory");
        assert!(!settings.store.sticky_terminal_states);
        assert_eq!(settings.batch.channel_mode, BatchChannelMode::Push);
        assert!(!settings.otel.enabled);
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_batch_mode_deserialize() {
        let config: BatchConfig = serde_json::from_str(r#"{"channel_mode":"policy"}"#).unwrap();
        assert_eq!(config.channel_mode, BatchChannelMode::Policy);
    }

    #[test]
    fn test_provider_name_per_channel() {
        let notify = NotifyConfig::default();
        assert_eq!(notify.provider_name(Channel::Email), "smtp-relay");
        assert_eq!(notify.provider_name(Channel::Sms), "twilio");
        assert_eq!(notify.provider_name(Channel::Push), "firebase");
    }
}
