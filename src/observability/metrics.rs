//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guildhq_requests_total` (counter): requests by method, status
//! - `guildhq_request_duration_seconds` (histogram): latency distribution
//! - `guildhq_guilds` (gauge): documents in the store
//! - `guildhq_prayer_outcomes_total` (counter): batch results by outcome
//! - `guildhq_rpc_health` (gauge): 1=reachable, 0=unreachable

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("guildhq_requests_total", &labels).increment(1);
    histogram!("guildhq_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_guild_count(count: usize) {
    gauge!("guildhq_guilds").set(count as f64);
}

pub fn record_prayer_outcome(outcome: &'static str) {
    counter!("guildhq_prayer_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("guildhq_rpc_health").set(if healthy { 1.0 } else { 0.0 });
}
