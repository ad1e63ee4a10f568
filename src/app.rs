// src/app.rs
use std::sync::Arc;

use intentor_api::{ApiHandlers, ApiServer, ClassifierStatus, Rejection};
use intentor_config::{resolve_api_key, IntentorConfig};
use intentor_core::{ClassificationResult, IntentorResult};
use intentor_llm_connector::{build_provider, LlmProvider};
use intentor_nlu::IntentClassifier;
use intentor_observability::MetricsCollector;
use tracing::{error, info};

pub struct IntentorApp {
    config: IntentorConfig,
    handlers: ApiHandlers,
}

impl IntentorApp {
    /// Resolves the credential and builds the configured provider.
    ///
    /// A missing credential does not fail construction; the app starts in a
    /// misconfigured state and reports the problem on every surface.
    pub fn new(config: IntentorConfig) -> IntentorResult<Self> {
        let provider = resolve_api_key(&config.llm).and_then(|key| build_provider(&config.llm, key));

        match provider {
            Ok(provider) => Self::with_provider(config, provider),
            Err(e) => {
                error!("{}", e);
                let metrics = Arc::new(MetricsCollector::new()?);
                let handlers = ApiHandlers::new(ClassifierStatus::Misconfigured(e.to_string()), metrics)?;
                Ok(Self { config, handlers })
            }
        }
    }

    pub fn with_provider(config: IntentorConfig, provider: Arc<dyn LlmProvider>) -> IntentorResult<Self> {
        info!(provider = provider.name(), model = %config.llm.model, "Initializing intent classifier");

        let metrics = Arc::new(MetricsCollector::new()?);
        let classifier = IntentClassifier::new(config.classifier.clone(), provider, metrics.clone());
        let handlers = ApiHandlers::new(ClassifierStatus::Ready(Arc::new(classifier)), metrics)?;

        Ok(Self { config, handlers })
    }

    pub fn is_configured(&self) -> bool {
        self.handlers.is_configured()
    }

    pub fn config_error(&self) -> Option<&str> {
        self.handlers.config_error()
    }

    pub async fn classify(&self, query: &str) -> Result<ClassificationResult, Rejection> {
        self.handlers.classify(query).await
    }

    /// Serves the web page and HTTP API until Ctrl+C.
    pub async fn run(self) -> IntentorResult<()> {
        info!("Starting intentor v{}", env!("CARGO_PKG_VERSION"));
        ApiServer::new(self.config.api, self.handlers).serve().await
    }
}
