//! Operational endpoints: liveness, host identity, resource usage, backend
//! health ladder, access log retrieval, stress-test trigger.
//!
//! These are peripheral to the relay itself and probe the backend on demand
//! rather than keeping any monitoring state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio::time;

use crate::config::schema::AccessLogConfig;
use crate::http::server::AppState;
use crate::status::system;

/// Liveness of the front end itself.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Host identity of the front-end machine.
pub async fn hostname() -> Json<serde_json::Value> {
    Json(json!({ "hostname": host_name() }))
}

pub(crate) fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// CPU and memory usage of the front-end machine, in percent.
pub async fn server_status() -> Json<serde_json::Value> {
    let usage = system::sample().await;
    Json(json!({
        "cpuUsage": usage.cpu_usage,
        "memoryUsage": usage.memory_usage,
    }))
}

/// Outcome of one backend probe.
enum Probe {
    /// Connect failed or timed out.
    Unreachable,
    /// Connected but got a non-success status.
    Unhealthy,
    Ok,
}

/// Walk the backend health ladder: reachability, application health, then
/// database connectivity. Reports the first layer that fails.
pub async fn check_server_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let backend = &state.config.backend;

    let status = match probe(&state, &backend.health_path).await {
        Probe::Unreachable => json!({
            "status": "backend-unreachable",
            "message": "The backend server could not be reached.",
        }),
        Probe::Unhealthy => json!({
            "status": "app-unhealthy",
            "message": "The backend server is reachable but the application is unhealthy.",
        }),
        Probe::Ok => match probe(&state, &backend.db_check_path).await {
            Probe::Ok => json!({
                "status": "ok",
                "message": "The application is running normally.",
            }),
            _ => json!({
                "status": "db-unhealthy",
                "message": "The application is running but its database connection is failing.",
            }),
        },
    };

    Json(status)
}

async fn probe(state: &AppState, path: &str) -> Probe {
    let uri = format!("http://{}{}", state.config.backend.address, path);
    let request = match Request::builder()
        .method("GET")
        .uri(&uri)
        .header("user-agent", "relay-front-status")
        .body(Body::empty())
    {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(uri = %uri, error = %e, "failed to build probe request");
            return Probe::Unreachable;
        }
    };

    let timeout = Duration::from_secs(state.config.timeouts.connect_secs);
    match time::timeout(timeout, state.client.request(request)).await {
        Ok(Ok(response)) if response.status().is_success() => Probe::Ok,
        Ok(Ok(response)) => {
            tracing::warn!(uri = %uri, status = %response.status(), "probe returned non-success status");
            Probe::Unhealthy
        }
        Ok(Err(e)) => {
            tracing::warn!(uri = %uri, error = %e, "probe connection failed");
            Probe::Unreachable
        }
        Err(_) => {
            tracing::warn!(uri = %uri, "probe timed out");
            Probe::Unreachable
        }
    }
}

/// Serve the current day's access log file.
pub async fn logs(State(state): State<AppState>) -> Response {
    let path = today_log_path(&state.config.access_log);

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => content.into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            "No access log exists for today yet.",
        )
            .into_response(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read access log");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read the access log.",
            )
                .into_response()
        }
    }
}

/// Path of today's rolling access log file.
///
/// The rolling appender stamps file names with the UTC date, so the lookup
/// must use UTC as well; the local date disagrees for part of every day on
/// any host away from UTC.
pub(crate) fn today_log_path(config: &AccessLogConfig) -> PathBuf {
    let date = chrono::Utc::now().format("%Y-%m-%d");
    Path::new(&config.directory).join(format!("{}.{}", config.file_prefix, date))
}

/// Kick off a CPU stress run in the background.
///
/// The `stress` binary must already be installed on the host.
pub async fn start_stress_test() -> Response {
    match tokio::process::Command::new("stress")
        .args(["--cpu", "1", "--timeout", "500"])
        .spawn()
    {
        Ok(mut child) => {
            tokio::spawn(async move {
                match child.wait().await {
                    Ok(status) => tracing::info!(%status, "stress test finished"),
                    Err(e) => tracing::error!(error = %e, "stress test wait failed"),
                }
            });
            (StatusCode::OK, "Stress test started.").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start stress test");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to start the stress test.",
            )
                .into_response()
        }
    }
}
