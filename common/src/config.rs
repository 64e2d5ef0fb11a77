use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "azure_openai")]
    AzureOpenAi,
    #[default]
    #[serde(rename = "mock")]
    Mock,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::AzureOpenAi => "azure_openai",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime options for one analysis. A snapshot of this struct is captured
/// when an invocation starts and echoed back in the response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub llm_provider: LlmProvider,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_semantic_column_threshold")]
    pub semantic_column_threshold: f64,
    #[serde(default = "default_minimum_spend")]
    pub minimum_spend: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::default(),
            llm_model: default_llm_model(),
            temperature: 0.0,
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            semantic_column_threshold: default_semantic_column_threshold(),
            minimum_spend: default_minimum_spend(),
        }
    }
}

/// Per-invocation overrides layered on top of an [`EngineConfig`].
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub semantic_column_threshold: Option<f64>,
    pub minimum_spend: Option<f64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let threshold = self.semantic_column_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig(format!(
                "semantic_column_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if !self.minimum_spend.is_finite() || self.minimum_spend < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "minimum_spend must be a non-negative number, got {}",
                self.minimum_spend
            )));
        }
        Ok(())
    }

    /// Returns a copy with every present override applied, validated.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = self.clone();
        if let Some(provider) = overrides.llm_provider {
            config.llm_provider = provider;
        }
        if let Some(model) = &overrides.llm_model {
            config.llm_model = model.clone();
        }
        if let Some(temperature) = overrides.temperature {
            config.temperature = temperature;
        }
        if let Some(top_p) = overrides.top_p {
            config.top_p = top_p;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(threshold) = overrides.semantic_column_threshold {
            config.semantic_column_threshold = threshold;
        }
        if let Some(minimum_spend) = overrides.minimum_spend {
            config.minimum_spend = minimum_spend;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_top_p() -> f64 {
    1.0
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_semantic_column_threshold() -> f64 {
    0.6
}

fn default_minimum_spend() -> f64 {
    50.0
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Settings {
    /// Loads settings from an optional TOML file, then `INSIGHT_*` environment
    /// variables (`INSIGHT_ENGINE__MINIMUM_SPEND=25`).
    pub fn new(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("INSIGHT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize().map_err(|e: ConfigError| {
            debug!(error = %e, "Failed to deserialize settings");
            e
        })?;

        settings.engine.validate()?;

        debug!(
            threshold = settings.engine.semantic_column_threshold,
            minimum_spend = settings.engine.minimum_spend,
            provider = %settings.engine.llm_provider,
            "Loaded settings"
        );

        Ok(settings)
    }
}
