// crates/api/src/handlers.rs

use std::fmt;
use std::sync::Arc;

use intentor_core::{ClassificationResult, IntentorResult};
use intentor_nlu::IntentClassifier;
use intentor_observability::{HealthStatus, MetricsCollector};
use tracing::{debug, warn};

use crate::page::PageRenderer;

/// Whether a credential was resolved at startup.
#[derive(Clone)]
pub enum ClassifierStatus {
    Ready(Arc<IntentClassifier>),
    Misconfigured(String),
}

/// Why a classification request was not forwarded to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyQuery,
    NotConfigured(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyQuery => write!(f, "Query must not be empty"),
            Rejection::NotConfigured(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for Rejection {}

pub struct ApiHandlers {
    status: ClassifierStatus,
    metrics: Arc<MetricsCollector>,
    page: PageRenderer,
}

impl ApiHandlers {
    pub fn new(status: ClassifierStatus, metrics: Arc<MetricsCollector>) -> IntentorResult<Self> {
        Ok(Self {
            status,
            metrics,
            page: PageRenderer::new()?,
        })
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.status, ClassifierStatus::Ready(_))
    }

    pub fn config_error(&self) -> Option<&str> {
        match &self.status {
            ClassifierStatus::Ready(_) => None,
            ClassifierStatus::Misconfigured(message) => Some(message),
        }
    }

    pub async fn classify(&self, query: &str) -> Result<ClassificationResult, Rejection> {
        // Blank queries are refused; anything else reaches the prompt unaltered.
        if query.trim().is_empty() {
            return Err(Rejection::EmptyQuery);
        }

        match &self.status {
            ClassifierStatus::Ready(classifier) => Ok(classifier.classify(query).await),
            ClassifierStatus::Misconfigured(message) => {
                warn!("Classification requested without a configured credential");
                Err(Rejection::NotConfigured(message.clone()))
            }
        }
    }

    /// Front page, classifying `query` first when one was submitted.
    pub async fn render_page(&self, query: Option<&str>) -> IntentorResult<String> {
        let query = query.unwrap_or_default();
        let result = match self.classify(query).await {
            Ok(result) => Some(result),
            Err(rejection) => {
                debug!(?rejection, "page rendered without a result");
                None
            }
        };

        self.page.render(query, self.config_error(), result.as_ref())
    }

    pub fn get_metrics(&self) -> IntentorResult<String> {
        self.metrics.get_prometheus_metrics()
    }

    pub fn health(&self) -> HealthStatus {
        self.metrics.get_health_status(self.is_configured())
    }
}
