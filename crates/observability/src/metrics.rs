use crate::MetricsSummary;
use intentor_core::{IntentorError, IntentorResult};
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transport,
    Parse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Parse => "parse",
        }
    }
}

pub struct Metrics {
    registry: Registry,
    requests: IntCounter,
    classifications: IntCounterVec,
    failures: IntCounterVec,
    completion_latency: Histogram,
}

fn registration(err: prometheus::Error) -> IntentorError {
    IntentorError::Server(format!("metrics registration failed: {}", err))
}

impl Metrics {
    pub fn new() -> IntentorResult<Self> {
        let registry = Registry::new_custom(Some("intentor".to_string()), None).map_err(registration)?;

        let requests = IntCounter::new("requests_total", "Classification requests received")
            .map_err(registration)?;
        let classifications = IntCounterVec::new(
            Opts::new("classifications_total", "Successful classifications by intent"),
            &["intent"],
        )
        .map_err(registration)?;
        let failures = IntCounterVec::new(
            Opts::new("failures_total", "Classifications that produced the error record"),
            &["kind"],
        )
        .map_err(registration)?;
        let completion_latency = Histogram::with_opts(HistogramOpts::new(
            "completion_latency_seconds",
            "Time spent waiting on the completion service",
        ))
        .map_err(registration)?;

        registry.register(Box::new(requests.clone())).map_err(registration)?;
        registry.register(Box::new(classifications.clone())).map_err(registration)?;
        registry.register(Box::new(failures.clone())).map_err(registration)?;
        registry.register(Box::new(completion_latency.clone())).map_err(registration)?;

        Ok(Self {
            registry,
            requests,
            classifications,
            failures,
            completion_latency,
        })
    }

    pub fn record_request(&self) {
        self.requests.inc();
    }

    pub fn record_classification(&self, intent: &str) {
        self.classifications.with_label_values(&[intent]).inc();
    }

    pub fn record_failure(&self, kind: FailureKind) {
        self.failures.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn observe_completion_latency(&self, seconds: f64) {
        self.completion_latency.observe(seconds);
    }

    pub fn encode(&self) -> IntentorResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| IntentorError::Server(format!("failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| IntentorError::Server(format!("metrics are not UTF-8: {}", e)))
    }

    pub fn get_summary(&self) -> MetricsSummary {
        let classified = self
            .registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == "intentor_classifications_total")
            .flat_map(|family| family.get_metric().iter())
            .map(|metric| metric.get_counter().get_value() as u64)
            .sum();

        MetricsSummary {
            total_requests: self.requests.get(),
            classified,
            transport_failures: self
                .failures
                .with_label_values(&[FailureKind::Transport.as_str()])
                .get(),
            parse_failures: self
                .failures
                .with_label_values(&[FailureKind::Parse.as_str()])
                .get(),
        }
    }
}
