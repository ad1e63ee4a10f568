// crates/config/src/loader.rs

use std::path::Path;

use intentor_core::{IntentorError, IntentorResult};
use tracing::{debug, info};

use crate::{ConfigValidator, IntentorConfig};

pub struct ConfigLoader;

impl ConfigLoader {
    /// File (when given), then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> IntentorResult<IntentorConfig> {
        let config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                debug!("No configuration file given, using defaults");
                IntentorConfig::default()
            }
        };

        let config = Self::apply_env_overrides(config, |name| std::env::var(name).ok())?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> IntentorResult<IntentorConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IntentorError::Config(format!("Failed to read config: {}", e)))?;

        Self::load_from_str(&content)
    }

    pub fn load_from_str(content: &str) -> IntentorResult<IntentorConfig> {
        toml::from_str(content)
            .map_err(|e| IntentorError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn apply_env_overrides<F>(mut config: IntentorConfig, lookup: F) -> IntentorResult<IntentorConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("INTENTOR_PROVIDER") {
            config.llm.provider = provider.parse()?;
        }
        if let Some(model) = lookup("INTENTOR_MODEL") {
            config.llm.model = model;
        }
        if let Some(level) = lookup("INTENTOR_LOG_LEVEL") {
            config.app.log_level = level;
        }
        if let Some(host) = lookup("INTENTOR_API_HOST") {
            config.api.host = host;
        }
        if let Some(port) = lookup("INTENTOR_API_PORT") {
            config.api.port = port
                .parse()
                .map_err(|_| IntentorError::Config(format!("Invalid API port: {}", port)))?;
        }
        if let Some(mode) = lookup("INTENTOR_FENCE_STRIPPING") {
            config.classifier.fence_stripping = mode.parse()?;
        }
        if let Some(policy) = lookup("INTENTOR_SCHEMA_POLICY") {
            config.classifier.schema_policy = policy.parse()?;
        }

        Ok(config)
    }
}
