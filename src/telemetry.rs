//! Process-wide logging and OpenTelemetry setup.
//!
//! Logs go to stdout as JSON. Tracer and meter providers are installed
//! globally so each subsystem's `telemetry.rs` can fetch its instruments from
//! `opentelemetry::global`. Settings follow the standard `OTEL_*` variables.

use crate::{Error, Result};

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Config, Sampler, TracerProvider};
use opentelemetry_sdk::Resource;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Resolved telemetry settings
#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub sampler: Sampler,
    pub resource: Vec<KeyValue>,
}

impl TelemetrySettings {
    /// Read `OTEL_SERVICE_NAME`, `OTEL_TRACES_SAMPLER[_ARG]` and
    /// `OTEL_RESOURCE_ATTRIBUTES`.
    pub fn from_env(default_service_name: &str) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let service_name = env("OTEL_SERVICE_NAME")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| default_service_name.to_string());
        if service_name.is_empty() {
            return Err(Error::Config("OTEL_SERVICE_NAME is empty".to_string()));
        }

        let sampler = sampler_from(
            env("OTEL_TRACES_SAMPLER").as_deref().unwrap_or("parentbased_always_on"),
            env("OTEL_TRACES_SAMPLER_ARG").as_deref(),
        )?;

        let mut resource = match env("OTEL_RESOURCE_ATTRIBUTES") {
            Some(raw) => resource_attributes(&raw)?,
            None => Vec::new(),
        };
        resource.retain(|kv| kv.key.as_str() != "service.name");
        resource.push(KeyValue::new("service.name", service_name.clone()));
        if !resource.iter().any(|kv| kv.key.as_str() == "service.namespace") {
            resource.push(KeyValue::new("service.namespace", "avro-flight-scorer"));
        }

        Ok(Self {
            service_name,
            sampler,
            resource,
        })
    }
}

/// Owns the installed providers; flushes them on drop
pub struct Telemetry {
    settings: TelemetrySettings,
    tracer_provider: TracerProvider,
    meter_provider: SdkMeterProvider,
}

impl Telemetry {
    /// Install logging and OTel providers for one binary.
    ///
    /// `RUST_LOG` takes precedence over `log_level` when set.
    pub fn init_for_component(default_service_name: &str, log_level: &str) -> Result<Self> {
        let settings = TelemetrySettings::from_env(default_service_name)?;

        let level = log_level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!(
                "log level '{log_level}' is not one of {LOG_LEVELS:?}"
            )));
        }
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

        FmtSubscriber::builder()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init()
            .map_err(|e| Error::Config(format!("log subscriber already installed: {e}")))?;

        let resource = Resource::new(settings.resource.clone());
        let tracer_provider = TracerProvider::builder()
            .with_config(
                Config::default()
                    .with_sampler(settings.sampler.clone())
                    .with_resource(resource.clone()),
            )
            .build();
        let meter_provider = SdkMeterProvider::builder().with_resource(resource).build();

        global::set_text_map_propagator(TraceContextPropagator::new());
        let _ = global::set_tracer_provider(tracer_provider.clone());
        global::set_meter_provider(meter_provider.clone());

        info!(
            service_name = %settings.service_name,
            log_level = %level,
            sampler = ?settings.sampler,
            "Telemetry ready"
        );

        Ok(Self {
            settings,
            tracer_provider,
            meter_provider,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.settings.service_name
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        let _ = self.meter_provider.shutdown();
        let _ = self.tracer_provider.shutdown();
    }
}

/// Sampler named by `OTEL_TRACES_SAMPLER`.
///
/// `parentbased_*` wraps the named root sampler.
fn sampler_from(name: &str, arg: Option<&str>) -> Result<Sampler> {
    let name = name.trim().to_ascii_lowercase();
    let (parent_based, root) = match name.strip_prefix("parentbased_") {
        Some(root) => (true, root),
        None => (false, name.as_str()),
    };

    let sampler = match root {
        "always_on" => Sampler::AlwaysOn,
        "always_off" => Sampler::AlwaysOff,
        "traceidratio" => {
            let ratio = arg
                .and_then(|a| a.trim().parse::<f64>().ok())
                .filter(|r| (0.0..=1.0).contains(r))
                .ok_or_else(|| {
                    Error::Config(format!(
                        "sampler '{name}' needs OTEL_TRACES_SAMPLER_ARG in [0,1], got {arg:?}"
                    ))
                })?;
            Sampler::TraceIdRatioBased(ratio)
        }
        _ => {
            return Err(Error::Config(format!(
                "OTEL_TRACES_SAMPLER '{name}' is not supported"
            )))
        }
    };

    Ok(if parent_based {
        Sampler::ParentBased(Box::new(sampler))
    } else {
        sampler
    })
}

/// Parse `key=value,key=value`; blank entries are skipped
fn resource_attributes(raw: &str) -> Result<Vec<KeyValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(KeyValue::new(
                key.trim().to_string(),
                value.trim().to_string(),
            )),
            _ => Err(Error::Config(format!(
                "OTEL_RESOURCE_ATTRIBUTES entry '{entry}' must be key=value"
            ))),
        })
        .collect()
}
