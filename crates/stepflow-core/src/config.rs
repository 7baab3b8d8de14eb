use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_FORWARD_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StepflowConfig {
    pub logging: LoggingConfig,
    pub forward: ForwardConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

/// Where envelopes are POSTed when the flow is embedded behind an HTTP host.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ForwardConfig {
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl ForwardConfig {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_FORWARD_TIMEOUT_MS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    pub log_events: bool,
}

impl StepflowConfig {
    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> CoreResult<Self> {
        let cfg: StepflowConfig = serde_json::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> CoreResult<()> {
        if let Some(endpoint) = &self.forward.endpoint {
            if endpoint.trim().is_empty() {
                return Err(crate::CoreError::Config(
                    "forward.endpoint must not be blank".to_string(),
                ));
            }
        }
        if self.forward.timeout_ms == Some(0) {
            return Err(crate::CoreError::Config(
                "forward.timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
