use beacon_core::AlertCategory;
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installs the global Prometheus recorder; `GET /metrics` renders from the handle.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

pub fn record_alert_triggered(category: AlertCategory) {
    counter!("alerts_triggered_total", "category" => category.as_str()).increment(1);
}

pub fn record_alert_resolved() {
    counter!("alerts_resolved_total").increment(1);
}

pub fn record_dispatch_started(category: AlertCategory) {
    counter!("dispatch_started_total", "category" => category.as_str()).increment(1);
}

pub fn record_dispatch_cancelled() {
    counter!("dispatch_cancelled_total").increment(1);
}

pub fn set_active_alerts(count: usize) {
    gauge!("active_alerts").set(count as f64);
}
