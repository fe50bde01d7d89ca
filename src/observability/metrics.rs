//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): forwarded requests by method, status
//! - `relay_request_duration_seconds` (histogram): forward latency
//! - `relay_ws_sessions_active` (gauge): bridges currently open
//! - `relay_ws_frames_total` (counter): frames forwarded by direction

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            describe_counter!(
                "relay_requests_total",
                "Requests forwarded to the backend, by method and status"
            );
            describe_histogram!(
                "relay_request_duration_seconds",
                "Latency of forwarded requests"
            );
            describe_gauge!(
                "relay_ws_sessions_active",
                "WebSocket bridges currently open"
            );
            describe_counter!(
                "relay_ws_frames_total",
                "WebSocket frames forwarded, by direction"
            );
            tracing::info!(address = %addr, "Metrics exporter started");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }
}

/// Record one forwarded HTTP request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("relay_request_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

/// Record one forwarded WebSocket frame.
pub fn record_ws_frame(direction: &'static str) {
    counter!("relay_ws_frames_total", "direction" => direction).increment(1);
}

pub fn ws_session_started() {
    gauge!("relay_ws_sessions_active").increment(1.0);
}

pub fn ws_session_ended() {
    gauge!("relay_ws_sessions_active").decrement(1.0);
}
