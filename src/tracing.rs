use std::io::IsTerminal;

use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    trace::{SdkTracerProvider, TracerProviderBuilder},
    Resource,
};
use tracing_subscriber::{layer::SubscriberExt, Layer};

use crate::config::{ExtensionConfig, TracingExporter};

const SERVICE_NAME: &str = "extension-lambda";

pub fn get_env_filter(config: &ExtensionConfig) -> tracing_subscriber::EnvFilter {
    // RUST_LOG takes precedence over the configured level.
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level))
}

pub fn get_log_layer<S>(config: &ExtensionConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    S: tracing::Subscriber,
{
    if config.structured_logging() {
        return Box::new(
            json_subscriber::fmt::layer()
                .with_span_list(false)
                .flatten_event(true)
                .flatten_current_span_on_top_level(true),
        );
    }

    Box::new(
        tracing_subscriber::fmt::layer()
            .with_ansi(std::io::stderr().is_terminal())
            .compact(),
    )
}

/// Installs the global subscriber. Returns the tracer provider when spans are
/// exported so the caller can flush it on shutdown.
pub fn setup_tracing(config: &ExtensionConfig) -> Result<Option<SdkTracerProvider>> {
    let base = tracing_subscriber::Registry::default();
    let log_layer = get_log_layer(config).with_filter(get_env_filter(config));

    let Some(TracingExporter::Otlp) = &config.telemetry.tracing_exporter else {
        tracing::subscriber::set_global_default(base.with(log_layer))?;
        return Ok(None);
    };

    let mut span_exporter = SpanExporter::builder().with_tonic();
    if let Some(endpoint) = &config.telemetry.endpoint {
        span_exporter = span_exporter.with_endpoint(endpoint.clone());
    }
    let span_exporter = span_exporter.build()?;

    let tracer_provider = TracerProviderBuilder::default()
        .with_resource(
            Resource::builder_empty()
                .with_service_name(SERVICE_NAME)
                .build(),
        )
        .with_simple_exporter(span_exporter)
        .build();
    global::set_tracer_provider(tracer_provider.clone());

    let span_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer_provider.tracer(SERVICE_NAME))
        .with_filter(get_env_filter(config));
    tracing::subscriber::set_global_default(base.with(log_layer).with(span_layer))?;

    Ok(Some(tracer_provider))
}
