//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! Returns all validation errors, not just the first, so an operator can fix
//! a config file in one pass.

use std::net::SocketAddr;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("backend.address {0:?} is not a valid host:port pair")]
    InvalidBackendAddress(String),

    #[error("{field} {value:?} must start with '/'")]
    PathNotAbsolute { field: &'static str, value: String },

    #[error("client.reconnect_delay_ms must be greater than zero")]
    ZeroReconnectDelay,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    // The backend address may be a hostname, so only check the shape.
    if !is_host_port(&config.backend.address) {
        errors.push(ValidationError::InvalidBackendAddress(
            config.backend.address.clone(),
        ));
    }

    let fixed_paths = [
        ("relay.ws_path", &config.relay.ws_path),
        ("relay.http_prefix", &config.relay.http_prefix),
        ("client.path", &config.client.path),
        ("backend.health_path", &config.backend.health_path),
        ("backend.db_check_path", &config.backend.db_check_path),
    ];
    let extra_paths = config
        .relay
        .extra_http_prefixes
        .iter()
        .map(|value| ("relay.extra_http_prefixes", value));

    for (field, value) in fixed_paths.into_iter().chain(extra_paths) {
        if !value.starts_with('/') {
            errors.push(ValidationError::PathNotAbsolute {
                field,
                value: value.clone(),
            });
        }
    }

    if config.client.reconnect_delay_ms == 0 {
        errors.push(ValidationError::ZeroReconnectDelay);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check for a `host:port` shape without resolving the host.
fn is_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
