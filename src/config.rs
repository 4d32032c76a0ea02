use std::{fmt::Debug, net::SocketAddr, path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use uuid::Uuid;

const LOCAL_ENV: &str = "local";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TracingExporter {
    Otlp,
}

/// Overrides for the AWS SDK configuration. Anything left unset is resolved
/// through the default provider chains (environment, profile, IMDS).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for every AWS service, e.g. a LocalStack URL.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

#[serde_inline_default]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    #[serde_inline_default(LOCAL_ENV.to_string())]
    pub env: String,
    #[serde_inline_default("0.0.0.0".to_string())]
    pub listen_host: String,
    #[serde_inline_default(DEFAULT_PORT)]
    pub port: u16,
    #[serde_inline_default("info".to_string())]
    pub log_level: String,
    // Defaults to json outside of the local env.
    #[serde(default)]
    pub log_format: Option<LogFormat>,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        ExtensionConfig {
            env: LOCAL_ENV.to_string(),
            listen_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            log_format: None,
            aws: Default::default(),
            telemetry: Default::default(),
        }
    }
}

impl ExtensionConfig {
    /// Loads the configuration from defaults, an optional YAML file and the
    /// process environment, in increasing order of precedence.
    ///
    /// `STEADYBIT_EXTENSION_PORT=8081` overrides `port`, nested keys use a
    /// double underscore (`STEADYBIT_EXTENSION_AWS__REGION`).
    /// `STEADYBIT_LOG_LEVEL` and `STEADYBIT_LOG_FORMAT` set the log options.
    pub fn load(path: Option<&Path>) -> Result<ExtensionConfig> {
        let mut figment = Figment::from(Serialized::defaults(ExtensionConfig::default()));
        if let Some(path) = path {
            let config_str = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            figment = figment.merge(Yaml::string(&config_str));
        }
        let mut config: ExtensionConfig = figment
            .merge(Env::prefixed("STEADYBIT_EXTENSION_").split("__"))
            .merge(
                Env::prefixed("STEADYBIT_LOG_")
                    .only(&["level", "format"])
                    .map(|key| format!("log_{}", key.as_str().to_ascii_lowercase()).into()),
            )
            .extract()?;
        if config.telemetry.instance_id.is_none() {
            config.telemetry.instance_id = Some(config.instance_id());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen_addr().parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!(
                "invalid listen address: {}",
                self.listen_addr()
            ));
        }
        if tracing::Level::from_str(&self.log_level).is_err() {
            return Err(anyhow::anyhow!("invalid log level: {}", self.log_level));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.port)
    }

    pub fn structured_logging(&self) -> bool {
        match self.log_format {
            Some(format) => format == LogFormat::Json,
            None => self.env != LOCAL_ENV,
        }
    }

    pub fn instance_id(&self) -> String {
        self.telemetry
            .instance_id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.env, Uuid::new_v4()))
    }
}

#[serde_inline_default]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    // Export metrics over OTLP.
    #[serde(default)]
    pub enable_metrics: bool,
    // OpenTelemetry collector grpc endpoint for both traces and metrics.
    // Defaults to OTEL_EXPORTER_OTLP_ENDPOINT or localhost:4317.
    #[serde(default)]
    pub endpoint: Option<String>,
    // Spans are only exported when an exporter is set.
    #[serde(default)]
    pub tracing_exporter: Option<TracingExporter>,
    #[serde(with = "duration_serde")]
    #[serde_inline_default(Duration::from_secs(10))]
    pub metrics_interval: Duration,
    #[serde(default)]
    pub instance_id: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enable_metrics: false,
            endpoint: None,
            tracing_exporter: None,
            metrics_interval: Duration::from_secs(10),
            instance_id: None,
        }
    }
}

mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(seconds))
    }
}
