// crates/observability/src/lib.rs

use intentor_core::IntentorResult;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

pub mod metrics;

pub use metrics::FailureKind;
use metrics::Metrics;

/// Metrics collector
pub struct MetricsCollector {
    metrics: Metrics,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> IntentorResult<Self> {
        Ok(Self {
            metrics: Metrics::new()?,
            start_time: Instant::now(),
        })
    }

    pub fn request_received(&self) {
        self.metrics.record_request();
    }

    pub fn classified(&self, intent: &str) {
        debug!(intent, "classification recorded");
        self.metrics.record_classification(intent);
    }

    pub fn failed(&self, kind: FailureKind) {
        self.metrics.record_failure(kind);
    }

    pub fn completion_latency(&self, elapsed: Duration) {
        self.metrics.observe_completion_latency(elapsed.as_secs_f64());
    }

    pub fn get_prometheus_metrics(&self) -> IntentorResult<String> {
        self.metrics.encode()
    }

    pub fn get_health_status(&self, configured: bool) -> HealthStatus {
        HealthStatus {
            healthy: true,
            configured,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            metrics: self.metrics.get_summary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub configured: bool,
    pub uptime_seconds: u64,
    pub version: String,
    pub metrics: MetricsSummary,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub classified: u64,
    pub transport_failures: u64,
    pub parse_failures: u64,
}
