//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay
//! front end. All types derive Serde traits for deserialization from config
//! files. The config is built once at startup and shared read-only via `Arc`;
//! there is no hot reload because the relay target is fixed for the lifetime
//! of the process.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay front end.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single backend origin everything is forwarded to.
    pub backend: BackendConfig,

    /// Relay paths (WebSocket path, HTTP proxy prefix).
    pub relay: RelayPathConfig,

    /// Relay client settings (endpoint scheme, reconnect policy).
    pub client: ClientConfig,

    /// Static page serving.
    pub static_files: StaticConfig,

    /// Access log file settings.
    pub access_log: AccessLogConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// The backend origin: a single host:port, immutable after startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend address (e.g., "127.0.0.1:3000").
    pub address: String,

    /// Path probed by `checkServerStatus` for application health.
    pub health_path: String,

    /// Path probed by `checkServerStatus` for database connectivity.
    pub db_check_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            health_path: "/healthCheck".to_string(),
            db_check_path: "/dbCheck".to_string(),
        }
    }
}

/// Paths the relay server claims on its own listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayPathConfig {
    /// Fixed path for WebSocket upgrade requests; forwarded to the backend
    /// at the same path, unmodified.
    pub ws_path: String,

    /// Path prefix for plain HTTP forwarding.
    pub http_prefix: String,

    /// Additional path prefixes forwarded to the backend verbatim, outside
    /// the main prefix.
    pub extra_http_prefixes: Vec<String>,
}

impl Default for RelayPathConfig {
    fn default() -> Self {
        Self {
            ws_path: "/api/ws".to_string(),
            http_prefix: "/api".to_string(),
            extra_http_prefixes: vec![
                "/was-server-status".to_string(),
                "/products/add".to_string(),
            ],
        }
    }
}

/// Relay client configuration.
///
/// Mirrors the hosting page's origin: the scheme follows `secure`, and
/// host/port equal the front end's own host/port.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,

    /// Host of the relay endpoint.
    pub host: String,

    /// Port of the relay endpoint.
    pub port: u16,

    /// Path of the relay endpoint.
    pub path: String,

    /// Fixed delay before each reconnect attempt, in milliseconds.
    /// There is no backoff growth and no retry cap.
    pub reconnect_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            secure: false,
            host: "127.0.0.1".to_string(),
            port: 8080,
            path: "/api/ws".to_string(),
            reconnect_delay_ms: 3000,
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory served at `/` (index.html appended on directories).
    pub directory: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            directory: "public".to_string(),
        }
    }
}

/// Access log configuration.
///
/// Log files roll daily; the `/logs` endpoint serves the current day's file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// Enable the access log file layer.
    pub enabled: bool,

    /// Directory the rolling log files are written to.
    pub directory: String,

    /// File name prefix; daily files are named `{prefix}.YYYY-MM-DD` with
    /// the UTC date.
    pub file_prefix: String,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: "logs".to_string(),
            file_prefix: "access.log".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds (backend dials).
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
