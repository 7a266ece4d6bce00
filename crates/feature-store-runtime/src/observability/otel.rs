//! Optional OpenTelemetry/Prometheus export, kept at parity with the
//! source crate's `otel` feature but disabled by default: this repo's
//! primary metrics path is [`super::metrics::CostTracker`].

#[cfg(feature = "otel")]
use opentelemetry::KeyValue;
#[cfg(feature = "otel")]
use opentelemetry_sdk::Resource;

#[derive(Debug, Clone)]
pub struct OtelConfig {
    pub service_name: String,
    pub service_version: String,
    pub enable_metrics: bool,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            service_name: "feature-store".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            enable_metrics: true,
        }
    }
}

#[cfg(feature = "otel")]
pub struct OtelContext {
    exporter: Option<opentelemetry_prometheus::PrometheusExporter>,
}

#[cfg(feature = "otel")]
impl OtelContext {
    pub fn metrics(&self) -> anyhow::Result<String> {
        if self.exporter.is_some() {
            Ok("# metrics available through the Prometheus exporter\n".to_string())
        } else {
            Ok("# otel metrics disabled\n".to_string())
        }
    }
}

#[cfg(feature = "otel")]
pub fn init_opentelemetry(config: OtelConfig) -> anyhow::Result<OtelContext> {
    let _resource = Resource::new(vec![KeyValue::new("service.name", config.service_name.clone())]);
    let exporter = if config.enable_metrics { Some(opentelemetry_prometheus::exporter().build()?) } else { None };
    tracing::info!(service_name = %config.service_name, "opentelemetry initialized");
    Ok(OtelContext { exporter })
}

#[cfg(not(feature = "otel"))]
pub struct OtelContext;

#[cfg(not(feature = "otel"))]
impl OtelContext {
    pub fn metrics(&self) -> anyhow::Result<String> {
        Ok("# otel feature not enabled\n".to_string())
    }
}

#[cfg(not(feature = "otel"))]
pub fn init_opentelemetry(_config: OtelConfig) -> anyhow::Result<OtelContext> {
    tracing::warn!("otel feature not enabled");
    Ok(OtelContext)
}
