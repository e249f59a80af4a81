use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::delay::{FixedDelay, IngestDelay, NoDelay, RandomDelay};
use crate::error::EngineError;

/// Root configuration — parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplogConfig {
    /// Interface the HTTP API binds to.
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// HTTP API port.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Most candidate offsets one `/internal/sync` reply may cover,
    /// counted from the contiguous watermark.
    #[serde(default = "default_max_sync_span")]
    pub max_sync_span: u64,

    /// Simulated latency of the append path.
    #[serde(default)]
    pub delay: DelayConfig,
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    9001
}

pub const DEFAULT_MAX_SYNC_SPAN: u64 = 1_000_000;

fn default_max_sync_span() -> u64 {
    DEFAULT_MAX_SYNC_SPAN
}

impl Default for ReplogConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            api_port: default_api_port(),
            max_sync_span: default_max_sync_span(),
            delay: DelayConfig::default(),
        }
    }
}

/// `[delay]` section.
///
/// ```toml
/// [delay]
/// kind = "random"
/// min_ms = 0
/// max_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DelayConfig {
    None,
    Fixed { ms: u64 },
    Random { min_ms: u64, max_ms: u64 },
}

impl Default for DelayConfig {
    fn default() -> Self {
        DelayConfig::Random { min_ms: 0, max_ms: 5000 }
    }
}

impl DelayConfig {
    /// Build the delay strategy.
    pub fn build(&self) -> Result<Arc<dyn IngestDelay>, EngineError> {
        Ok(match *self {
            DelayConfig::None => Arc::new(NoDelay),
            DelayConfig::Fixed { ms } => Arc::new(FixedDelay(Duration::from_millis(ms))),
            DelayConfig::Random { min_ms, max_ms } => Arc::new(
                RandomDelay::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
                    .ok_or_else(|| {
                        EngineError::Config(format!(
                            "delay: min_ms ({min_ms}) > max_ms ({max_ms})"
                        ))
                    })?,
            ),
        })
    }
}

impl ReplogConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))?;
        if config.max_sync_span == 0 {
            return Err(EngineError::Config("max_sync_span must be at least 1".into()));
        }
        config.delay.build()?;
        Ok(config)
    }
}
