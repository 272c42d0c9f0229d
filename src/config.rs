//! Application configuration.
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables for values that should not live on disk. API keys are injected
//! configuration with **no default**: a configured outpaint section without a
//! key fails validation immediately instead of silently falling back to a
//! baked-in credential.
//!
//! ```toml
//! # All sections are optional — defaults shown below
//!
//! [limits]
//! max_input_bytes = 10485760   # 10 MiB inline-payload ceiling
//! request_budget_secs = 60     # overall per-request budget
//!
//! [outpaint]
//! endpoint = "https://gen.example.com/v1/outpaint"
//! # api_key has no default; set it here or via REFRAME_OUTPAINT_API_KEY
//! timeout_secs = 30
//!
//! [compression]
//! endpoint = "https://optimize.example.com/v1/compress"
//! timeout_secs = 15
//! ```
//!
//! Environment overrides: `REFRAME_OUTPAINT_ENDPOINT`,
//! `REFRAME_OUTPAINT_API_KEY`, `REFRAME_COMPRESSION_ENDPOINT`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(
        "outpaint endpoint is configured but no API key is set; \
         add api_key to [outpaint] or set REFRAME_OUTPAINT_API_KEY"
    )]
    MissingApiKey,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    pub outpaint: Option<OutpaintConfig>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    #[serde(default = "default_request_budget_secs")]
    pub request_budget_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            request_budget_secs: default_request_budget_secs(),
        }
    }
}

impl LimitsConfig {
    pub fn request_budget(&self) -> Duration {
        Duration::from_secs(self.request_budget_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutpaintConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_outpaint_timeout_secs")]
    pub timeout_secs: u64,
}

impl OutpaintConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionConfig {
    pub endpoint: String,
    #[serde(default = "default_compression_timeout_secs")]
    pub timeout_secs: u64,
}

impl CompressionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_max_input_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_request_budget_secs() -> u64 {
    60
}

fn default_outpaint_timeout_secs() -> u64 {
    30
}

fn default_compression_timeout_secs() -> u64 {
    15
}

impl AppConfig {
    /// Load from an optional file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("REFRAME_OUTPAINT_ENDPOINT") {
            match &mut self.outpaint {
                Some(outpaint) => outpaint.endpoint = endpoint,
                None => {
                    self.outpaint = Some(OutpaintConfig {
                        endpoint,
                        api_key: None,
                        timeout_secs: default_outpaint_timeout_secs(),
                    })
                }
            }
        }
        if let Ok(key) = std::env::var("REFRAME_OUTPAINT_API_KEY")
            && let Some(outpaint) = &mut self.outpaint
        {
            outpaint.api_key = Some(key);
        }
        if let Ok(endpoint) = std::env::var("REFRAME_COMPRESSION_ENDPOINT") {
            match &mut self.compression {
                Some(compression) => compression.endpoint = endpoint,
                None => {
                    self.compression = Some(CompressionConfig {
                        endpoint,
                        timeout_secs: default_compression_timeout_secs(),
                    })
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(outpaint) = &self.outpaint
            && outpaint.api_key.as_deref().unwrap_or("").is_empty()
        {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}
