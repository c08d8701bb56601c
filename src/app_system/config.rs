//! Engine settings: TOML or environment, validated before the engine starts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::DEFAULT_DELIVERY_FEE;
use crate::progression::ProgressionDelays;
use crate::reporting::DEFAULT_TOP_ITEMS;

pub const ENV_DELIVERY_FEE: &str = "FOODHUB_DELIVERY_FEE";
pub const ENV_CHANNEL_CAPACITY: &str = "FOODHUB_CHANNEL_CAPACITY";
pub const ENV_PROGRESSION_MS: &str = "FOODHUB_PROGRESSION_MS";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("{field} out of range: {message}")]
    OutOfRange { field: &'static str, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub delivery_fee: Decimal,
    /// Mailbox size of every actor.
    pub channel_capacity: usize,
    pub progression: ProgressionDelays,
    pub top_items_limit: usize,
    /// Delivered orders kept on the admin status board.
    pub recent_delivered_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delivery_fee: DEFAULT_DELIVERY_FEE,
            channel_capacity: 32,
            progression: ProgressionDelays::default(),
            top_items_limit: DEFAULT_TOP_ITEMS,
            recent_delivered_limit: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the `FOODHUB_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(fee) = parse_var::<Decimal>(&lookup, ENV_DELIVERY_FEE)? {
            config.delivery_fee = fee;
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, ENV_CHANNEL_CAPACITY)? {
            config.channel_capacity = capacity;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_PROGRESSION_MS)? {
            config.progression = ProgressionDelays::uniform(Duration::from_millis(ms));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery_fee < Decimal::ZERO {
            return Err(ConfigError::OutOfRange {
                field: "delivery_fee",
                message: format!("{} is negative", self.delivery_fee),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                field: "channel_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw,
    })
}
