mod settings;

pub use settings::{
    BatchChannelMode, BatchConfig, NotifyConfig, OtelConfig, ServerConfig, Settings, StoreConfig,
};
