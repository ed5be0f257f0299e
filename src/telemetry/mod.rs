//! Telemetry module
//!
//! Logging and metrics

mod gauges;
mod logging;

pub use gauges::{
    install_prometheus, record_decision, record_rejection, record_risk_status, set_gauge,
    GaugeMetric,
};
pub use logging::{init_logging, LogFormat};

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusHandle;

/// Keeps telemetry state alive for the life of the process
pub struct TelemetryGuard {
    metrics: Option<PrometheusHandle>,
}

impl TelemetryGuard {
    /// Current metrics in Prometheus text format, if a recorder is installed
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(|handle| handle.render())
    }
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    let metrics = if config.metrics_enabled {
        Some(install_prometheus()?)
    } else {
        None
    };

    Ok(TelemetryGuard { metrics })
}
