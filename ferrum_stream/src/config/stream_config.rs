use crate::framework::errors::FerrumStreamError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DROPPED_GROUP: &str = "FerrumStream";
pub const DEFAULT_DROPPED_NAME: &str = "dropped_records";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

fn default_dropped_group() -> String {
    DEFAULT_DROPPED_GROUP.to_string()
}

fn default_dropped_name() -> String {
    DEFAULT_DROPPED_NAME.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Runtime settings for one job invocation.
///
/// Malformed reducer lines are always dropped; `dropped_counter_enabled`
/// only decides whether the drop is also reported as a counter.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StreamConfig {
    #[serde(rename = "dropped.counter.enabled", default)]
    pub dropped_counter_enabled: bool,

    #[serde(rename = "dropped.counter.group", default = "default_dropped_group")]
    pub dropped_counter_group: String,

    #[serde(rename = "dropped.counter.name", default = "default_dropped_name")]
    pub dropped_counter_name: String,

    #[serde(rename = "log.level", default = "default_log_level")]
    pub log_level: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            dropped_counter_enabled: false,
            dropped_counter_group: default_dropped_group(),
            dropped_counter_name: default_dropped_name(),
            log_level: default_log_level(),
        }
    }
}

impl StreamConfig {
    pub fn from_xml_file(file_path: &str) -> Result<Self, FerrumStreamError> {
        let xml_str = std::fs::read_to_string(file_path).map_err(|err| {
            FerrumStreamError::ConfigError(format!("cannot read {}: {}", file_path, err))
        })?;
        Self::from_xml_str(&xml_str)
    }

    pub fn from_xml_str(xml_str: &str) -> Result<Self, FerrumStreamError> {
        let config = serde_xml_rs::from_str(xml_str)?;
        Ok(config)
    }

    /// Parses `log_level` into a tracing level.
    pub fn tracing_level(&self) -> Result<tracing::Level, FerrumStreamError> {
        self.log_level.parse::<tracing::Level>().map_err(|_| {
            FerrumStreamError::ConfigError(format!("unknown log level '{}'", self.log_level))
        })
    }
}
