// crates/config/src/validator.rs

use intentor_core::{IntentorError, IntentorResult};
use tracing::warn;

use crate::IntentorConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &IntentorConfig) -> IntentorResult<()> {
        // LLM settings
        if config.llm.model.trim().is_empty() {
            return Err(IntentorError::Config("Model name must not be empty".to_string()));
        }
        if config.llm.api_key_env.trim().is_empty() {
            return Err(IntentorError::Config("api_key_env must name a variable".to_string()));
        }
        if config.llm.timeout_s == 0 {
            return Err(IntentorError::Config("Timeout must be > 0".to_string()));
        }
        if let Some(temperature) = config.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(IntentorError::Config("Temperature must be 0.0-2.0".to_string()));
            }
        }
        if let Some(top_p) = config.llm.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(IntentorError::Config("top_p must be 0.0-1.0".to_string()));
            }
        }
        if config.llm.max_tokens == Some(0) {
            return Err(IntentorError::Config("max_tokens must be > 0".to_string()));
        }
        if let Some(path) = &config.llm.secrets_file {
            if !path.exists() {
                warn!("Secrets file does not exist: {:?}", path);
            }
        }

        // Classifier settings
        if config.classifier.max_concurrent_requests == 0 {
            return Err(IntentorError::Config(
                "max_concurrent_requests must be >= 1".to_string(),
            ));
        }

        // API settings
        if config.api.port == 0 {
            return Err(IntentorError::Config("Invalid API port".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ConfigValidator::validate(&IntentorConfig::default()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = IntentorConfig::default();
        config.llm.temperature = Some(3.5);
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = IntentorConfig::default();
        config.llm.top_p = Some(-0.1);
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = IntentorConfig::default();
        config.classifier.max_concurrent_requests = 0;
        assert!(ConfigValidator::validate(&config).is_err());

        let mut config = IntentorConfig::default();
        config.api.port = 0;
        assert_eq!(
            ConfigValidator::validate(&config).unwrap_err().to_string(),
            "Configuration error: Invalid API port"
        );
    }

    #[test]
    fn rejects_blank_model() {
        let mut config = IntentorConfig::default();
        config.llm.model = "  ".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
