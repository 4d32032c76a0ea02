use std::time::{Duration, Instant};

use anyhow::Result;
use opentelemetry::{
    metrics::{Counter, Histogram},
    KeyValue,
};
use opentelemetry_otlp::{MetricExporter, WithExportConfig};
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    Resource,
};

use crate::config::ExtensionConfig;

pub fn low_latency_boundaries() -> Vec<f64> {
    vec![
        0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ]
}

/// Installs the global meter provider. Meters created before this call, or
/// when metrics are disabled, record into the no-op provider.
pub fn init_provider(config: &ExtensionConfig, service_version: &str) -> Result<()> {
    if !config.telemetry.enable_metrics {
        return Ok(());
    }

    let resource = Resource::builder()
        .with_attribute(KeyValue::new("service.namespace", "steadybit"))
        .with_attribute(KeyValue::new("service.name", "extension-lambda"))
        .with_attribute(KeyValue::new("service.instance.id", config.instance_id()))
        .with_attribute(KeyValue::new(
            "service.version",
            service_version.to_string(),
        ))
        .build();

    let mut exporter = MetricExporter::builder().with_tonic();
    if let Some(endpoint) = &config.telemetry.endpoint {
        exporter = exporter.with_endpoint(endpoint.to_owned());
    }
    let exporter = exporter.build()?;

    let reader = PeriodicReader::builder(exporter)
        .with_interval(config.telemetry.metrics_interval)
        .build();

    let provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build();

    opentelemetry::global::set_meter_provider(provider);
    Ok(())
}

pub trait TimerUpdate {
    fn add(&self, duration: Duration, labels: &[KeyValue]);
}

impl TimerUpdate for Histogram<f64> {
    fn add(&self, duration: Duration, labels: &[KeyValue]) {
        self.record(duration.as_secs_f64(), labels);
    }
}

/// Records the time between its creation and drop.
pub struct Timer<'a, T: TimerUpdate + Sync> {
    start: Instant,
    metric: &'a T,
    labels: &'a [KeyValue],
}

impl<'a, T: TimerUpdate + Sync> Timer<'a, T> {
    #[must_use]
    pub fn start_with_labels(metric: &'a T, labels: &'a [KeyValue]) -> Self {
        Self {
            start: Instant::now(),
            metric,
            labels,
        }
    }
}

impl<T: TimerUpdate + Sync> Drop for Timer<'_, T> {
    fn drop(&mut self) {
        self.metric.add(self.start.elapsed(), self.labels);
    }
}

pub mod extension {
    use strum::IntoStaticStr;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
    #[strum(serialize_all = "snake_case")]
    pub enum ActionOperation {
        Prepare,
        Start,
        Stop,
    }

    #[derive(Debug)]
    pub struct Metrics {
        pub discovery_duration: Histogram<f64>,
        pub discovered_targets: Counter<u64>,
        pub action_operations: Counter<u64>,
    }

    impl Default for Metrics {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Metrics {
        pub fn new() -> Metrics {
            let meter = opentelemetry::global::meter("extension-lambda");
            let discovery_duration = meter
                .f64_histogram("extension_lambda.discovery_duration")
                .with_unit("s")
                .with_boundaries(low_latency_boundaries())
                .with_description("duration of a full lambda function enumeration")
                .build();
            let discovered_targets = meter
                .u64_counter("extension_lambda.discovered_targets")
                .with_description("number of lambda targets returned to the agent")
                .build();
            let action_operations = meter
                .u64_counter("extension_lambda.action_operations")
                .with_description("action prepare/start/stop calls by outcome")
                .build();
            Metrics {
                discovery_duration,
                discovered_targets,
                action_operations,
            }
        }

        pub fn record_action(&self, operation: ActionOperation, success: bool) {
            let operation: &'static str = operation.into();
            let outcome = if success { "success" } else { "failure" };
            self.action_operations.add(
                1,
                &[
                    KeyValue::new("operation", operation),
                    KeyValue::new("outcome", outcome),
                ],
            );
        }
    }
}
