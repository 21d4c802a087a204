//! Tracing and OpenTelemetry metrics initialization.

use crate::RolloutMode;
#[cfg(feature = "metrics")]
use opentelemetry::{KeyValue, global, metrics::Counter};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
};
#[cfg(feature = "metrics")]
use opentelemetry_stdout::MetricExporter as StdoutExporter;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;
#[cfg(feature = "metrics")]
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format (`json` or anything else for text).
pub const LOG_FORMAT_ENV: &str = "ROLLOUT_LOG_FORMAT";

#[cfg(feature = "metrics")]
const EXPORT_INTERVAL: Duration = Duration::from_secs(60);

#[cfg(feature = "metrics")]
static METER_PROVIDER: OnceLock<SdkMeterProvider> = OnceLock::new();

#[cfg(feature = "metrics")]
static GENERATION_REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();

/// Initialize logging, and metrics when the `metrics` feature is enabled.
///
/// Installs a global `tracing` subscriber filtered by `RUST_LOG` (default
/// `info`). Setting `ROLLOUT_LOG_FORMAT=json` switches to JSON lines. Calling
/// this more than once is harmless: later calls keep the first subscriber.
///
/// With `metrics`, a stdout meter provider is registered globally and
/// [`record_generation`] starts counting.
pub fn init_observability(service_name: &'static str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let installed = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    if installed.is_err() {
        debug!("Global subscriber already installed, keeping it");
    }

    init_metrics(service_name)
}

#[cfg(not(feature = "metrics"))]
fn init_metrics(service_name: &'static str) {
    info!(
        service_name = service_name,
        "Metrics feature disabled - skipping metrics initialization"
    );
}

#[cfg(feature = "metrics")]
fn init_metrics(service_name: &'static str) {
    if METER_PROVIDER.get().is_some() {
        debug!("Meter provider already registered");
        return;
    }

    let resource = Resource::builder_empty()
        .with_attributes([KeyValue::new("service.name", service_name)])
        .build();

    let reader = PeriodicReader::builder(StdoutExporter::default())
        .with_interval(EXPORT_INTERVAL)
        .build();

    let provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build();

    if METER_PROVIDER.set(provider.clone()).is_ok() {
        global::set_meter_provider(provider);
        info!(service_name = service_name, "Meter provider registered globally");
    }
}

/// Count one generation call, labelled by mode and outcome.
///
/// No-op unless the `metrics` feature is enabled.
pub fn record_generation(mode: RolloutMode, outcome: &'static str) {
    #[cfg(feature = "metrics")]
    {
        let counter = GENERATION_REQUESTS.get_or_init(|| {
            global::meter("rollout")
                .u64_counter("generation_requests")
                .with_description("Generation calls by mode and outcome")
                .build()
        });
        counter.add(
            1,
            &[
                KeyValue::new("mode", mode.to_string()),
                KeyValue::new("outcome", outcome),
            ],
        );
    }

    #[cfg(not(feature = "metrics"))]
    {
        let _ = (mode, outcome);
    }
}

/// Flush and shut down the meter provider.
#[instrument]
pub fn shutdown_observability() {
    info!("Shutting down observability");

    #[cfg(feature = "metrics")]
    {
        if let Some(provider) = METER_PROVIDER.get()
            && let Err(e) = provider.shutdown()
        {
            tracing::warn!(error = %e, "Meter provider shutdown failed");
        }
    }

    debug!("Observability shutdown complete");
}
