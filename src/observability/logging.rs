//! Structured logging and the access log.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (env-filter + console fmt layer)
//! - Write access log lines to a daily-rolling file
//!
//! # Design Decisions
//! - Access lines use a dedicated `access` target: the file layer accepts
//!   only that target and the console layer rejects it, so operational logs
//!   and the access log never mix
//! - The rolling file is what the `/logs` endpoint reads back

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter, Targets},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::config::schema::{AccessLogConfig, ObservabilityConfig};
use crate::http::server::AppState;
use crate::status::handlers::host_name;

/// Target reserved for access log lines.
pub const ACCESS_TARGET: &str = "access";

/// Keeps the non-blocking access log writer alive.
/// Dropping it flushes and stops the background writer thread.
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Initialize the tracing subscriber.
///
/// Returns a guard that must be held for the lifetime of the process so the
/// access log writer can flush.
pub fn init(observability: &ObservabilityConfig, access: &AccessLogConfig) -> LogGuard {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "relay_front={level},tower_http={level},{ACCESS_TARGET}=info",
            level = observability.log_level
        ))
    });

    let console_layer = tracing_subscriber::fmt::layer()
        .with_filter(filter_fn(|metadata| metadata.target() != ACCESS_TARGET));

    let (access_layer, worker) = if access.enabled {
        let appender = tracing_appender::rolling::daily(&access.directory, &access.file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .with_filter(Targets::new().with_target(ACCESS_TARGET, LevelFilter::INFO));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(access_layer)
        .init();

    LogGuard { _worker: worker }
}

/// Access log middleware.
///
/// One line per request with the usual combined-log fields:
/// hostname, URL, method, status, remote address, user agent. Requests to
/// the proxied namespaces are skipped; the backend keeps its own logs.
pub async fn access_log(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let relay = &state.config.relay;
    let proxied = path.starts_with(&relay.http_prefix)
        || relay
            .extra_http_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));

    let method = request.method().to_string();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    if !proxied {
        tracing::info!(
            target: ACCESS_TARGET,
            host = %host_name(),
            url = %path,
            method = %method,
            status = response.status().as_u16(),
            remote_addr = %addr.ip(),
            user_agent = %user_agent,
        );
    }

    response
}
