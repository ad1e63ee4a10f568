// crates/config/src/lib.rs

use intentor_api::ApiConfig;
use intentor_llm_connector::LlmConfig;
use intentor_nlu::ClassifierConfig;
use serde::{Deserialize, Serialize};

pub mod loader;
pub mod secrets;
pub mod validator;

pub use loader::ConfigLoader;
pub use secrets::resolve_api_key;
pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentorConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}
