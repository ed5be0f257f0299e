//! Risk and admission metrics
//!
//! Emitted through the `metrics` facade; they are dropped unless a recorder
//! has been installed (see `install_prometheus`).

use crate::risk::RiskStatus;
use crate::score::Decision;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Ceiling for the open day
    DailyLimit,
    /// Max potential loss committed today
    RiskUsed,
    /// Share of the ceiling committed
    Utilization,
    /// Current losing streak
    ConsecutiveLossDays,
    /// Realized P&L today
    DayPnl,
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::DailyLimit => "rfib_daily_limit_usd",
            GaugeMetric::RiskUsed => "rfib_risk_used_usd",
            GaugeMetric::Utilization => "rfib_utilization_ratio",
            GaugeMetric::ConsecutiveLossDays => "rfib_consecutive_loss_days",
            GaugeMetric::DayPnl => "rfib_day_pnl_usd",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: Decimal) {
    metrics::gauge!(metric.name()).set(value.to_f64().unwrap_or(0.0));
}

/// Publish a risk snapshot as gauges
pub fn record_risk_status(status: &RiskStatus) {
    set_gauge(GaugeMetric::DailyLimit, status.daily_limit);
    set_gauge(GaugeMetric::RiskUsed, status.risk_used);
    set_gauge(GaugeMetric::Utilization, status.current_utilization);
    set_gauge(
        GaugeMetric::ConsecutiveLossDays,
        Decimal::from(status.consecutive_loss_days),
    );
    set_gauge(GaugeMetric::DayPnl, status.day_pnl);
}

/// Count a GoScore decision
pub fn record_decision(decision: Decision) {
    metrics::counter!("goscore_decisions_total", "decision" => decision.as_str()).increment(1);
}

/// Count a gate rejection by cause
pub fn record_rejection(cause: &'static str) {
    metrics::counter!("admission_rejections_total", "cause" => cause).increment(1);
}

/// Install a process-wide Prometheus recorder and return its handle
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))
}
