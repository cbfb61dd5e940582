//! Metrics collection and exposition.
//!
//! # Metrics
//! - `installer_config_reads_total` (counter): `GET /config` by outcome
//! - `installer_config_writes_total` (counter): `POST /config` by outcome
//! - `installer_action_runs_total` (counter): install/uninstall runs by action, outcome
//! - `installer_action_exit_code` (gauge): last exit code per action
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_config_read(outcome: &'static str) {
    counter!("installer_config_reads_total", "outcome" => outcome).increment(1);
}

pub fn record_config_write(outcome: &'static str) {
    counter!("installer_config_writes_total", "outcome" => outcome).increment(1);
}

pub fn record_action_run(action: &'static str, outcome: &'static str) {
    counter!("installer_action_runs_total", "action" => action, "outcome" => outcome).increment(1);
}

pub fn record_action_exit(action: &'static str, exit_code: i32) {
    gauge!("installer_action_exit_code", "action" => action).set(f64::from(exit_code));
}
