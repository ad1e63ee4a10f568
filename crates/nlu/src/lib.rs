// crates/nlu/src/lib.rs

use std::sync::Arc;
use std::time::Instant;

use intentor_core::{ClassificationResult, Intent};
use intentor_llm_connector::{CompletionRequest, LlmConnector, LlmProvider, PromptBuilder};
use intentor_observability::{FailureKind, MetricsCollector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod interpreter;

pub use interpreter::{FenceStripping, ResponseInterpreter, SchemaPolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub fence_stripping: FenceStripping,
    #[serde(default)]
    pub schema_policy: SchemaPolicy,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

const fn default_max_concurrent_requests() -> usize {
    1
}

/// Classifies one query per call: prompt, completion, interpretation.
pub struct IntentClassifier {
    prompt_builder: PromptBuilder,
    connector: LlmConnector,
    interpreter: ResponseInterpreter,
    metrics: Arc<MetricsCollector>,
}

impl IntentClassifier {
    pub fn new(
        config: ClassifierConfig,
        provider: Arc<dyn LlmProvider>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            prompt_builder: PromptBuilder::new(),
            connector: LlmConnector::new(provider, config.max_concurrent_requests),
            interpreter: ResponseInterpreter::new(config.fence_stripping, config.schema_policy),
            metrics,
        }
    }

    pub async fn classify(&self, query: &str) -> ClassificationResult {
        self.metrics.request_received();

        let prompt = self.prompt_builder.build_classification_prompt(query);
        let start = Instant::now();
        let completion = self.connector.complete(CompletionRequest::prompt(prompt)).await;
        self.metrics.completion_latency(start.elapsed());

        let transport_failed = matches!(&completion, Err(e) if e.is_transport());
        let result = self.interpreter.interpret(completion);

        match (result.is_error(), transport_failed) {
            (false, _) => {
                info!(intent = %result.intent, internet = ?result.internet, "query classified");
                self.metrics.classified(metric_label(&result.intent));
            }
            (true, true) => {
                warn!(error = %result.action, "completion failed");
                self.metrics.failed(FailureKind::Transport);
            }
            (true, false) => {
                warn!(error = %result.action, "model reply could not be interpreted");
                self.metrics.failed(FailureKind::Parse);
            }
        }

        result
    }
}

/// Label value for model-invented intents, so the series count stays bounded.
pub const UNLISTED_METRIC_LABEL: &str = "unlisted";

fn metric_label(intent: &Intent) -> &str {
    match intent {
        Intent::Unlisted(_) => UNLISTED_METRIC_LABEL,
        other => other.as_str(),
    }
}
