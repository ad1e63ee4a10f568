use std::collections::HashMap;
use std::path::Path;

use intentor_core::{IntentorError, IntentorResult};
use intentor_llm_connector::{ApiKey, LlmConfig};
use tracing::debug;

/// Key under which a secrets file stores the credential.
pub const SECRETS_FILE_KEY: &str = "API-KEY";

/// Resolves the credential from the process environment or the secrets file.
pub fn resolve_api_key(config: &LlmConfig) -> IntentorResult<ApiKey> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

pub fn resolve_api_key_with<F>(config: &LlmConfig, lookup: F) -> IntentorResult<ApiKey>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(&config.api_key_env).filter(|k| !k.trim().is_empty()) {
        debug!(source = %config.api_key_env, "API key taken from environment");
        return ApiKey::new(key);
    }

    if let Some(path) = &config.secrets_file {
        if let Some(key) = read_secrets_file(path, &config.api_key_env)? {
            debug!(source = %path.display(), "API key taken from secrets file");
            return ApiKey::new(key);
        }
    }

    Err(IntentorError::Config(format!(
        "Error configuring the API. Please make sure you have set your {} secret.",
        config.api_key_env
    )))
}

fn read_secrets_file(path: &Path, env_name: &str) -> IntentorResult<Option<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        IntentorError::Config(format!("Failed to read secrets file {}: {}", path.display(), e))
    })?;
    let secrets: HashMap<String, toml::Value> = toml::from_str(&content).map_err(|e| {
        IntentorError::Config(format!("Failed to parse secrets file {}: {}", path.display(), e))
    })?;

    Ok([SECRETS_FILE_KEY, env_name]
        .iter()
        .filter_map(|name| secrets.get(*name))
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn prefers_environment_variable() {
        let config = LlmConfig::default();
        let key = resolve_api_key_with(&config, |name| {
            (name == "GEMINI_API_KEY").then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(key.expose(), "from-env");
    }

    #[test]
    fn falls_back_to_secrets_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "\"API-KEY\" = \"from-file\"\n").unwrap();

        let config = LlmConfig {
            secrets_file: Some(path),
            ..LlmConfig::default()
        };
        let key = resolve_api_key_with(&config, |_| Some("   ".to_string())).unwrap();
        assert_eq!(key.expose(), "from-file");
    }

    #[test]
    fn secrets_file_may_use_env_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "GEMINI_API_KEY = \"named\"\n").unwrap();

        let config = LlmConfig {
            secrets_file: Some(path),
            ..LlmConfig::default()
        };
        assert_eq!(resolve_api_key_with(&config, no_env).unwrap().expose(), "named");
    }

    #[test]
    fn missing_credential_is_a_visible_config_error() {
        let err = resolve_api_key_with(&LlmConfig::default(), no_env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Error configuring the API. Please make sure you have set your GEMINI_API_KEY secret."
        );
    }

    #[test]
    fn unreadable_secrets_file_is_reported() {
        let dir = tempdir().unwrap();
        let config = LlmConfig {
            secrets_file: Some(dir.path().join("missing.toml")),
            ..LlmConfig::default()
        };
        let err = resolve_api_key_with(&config, no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to read secrets file"));
    }
}
