//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: relay path, proxy namespace, status endpoints,
//!   static page fallback
//! - Wire up middleware (tracing, timeout, request ID, access log)
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    routing::{any, get, post},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::{proxy, websocket};
use crate::observability::logging;
use crate::status::handlers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the relay front end.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        let config = Arc::new(config);

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            config: config.clone(),
            client,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all routes and middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let static_files = ServeDir::new(&config.static_files.directory)
            .append_index_html_on_directories(true);

        // The exact relay path wins over the proxy wildcard.
        let mut router = Router::new()
            .route(&config.relay.ws_path, get(websocket::handle_upgrade))
            .route(&config.relay.http_prefix, any(proxy::forward))
            .route(
                &format!("{}/{{*path}}", config.relay.http_prefix),
                any(proxy::forward),
            );

        for prefix in &config.relay.extra_http_prefixes {
            router = router
                .route(prefix, any(proxy::forward))
                .route(&format!("{prefix}/{{*path}}"), any(proxy::forward));
        }

        router
            .route("/healthz", get(handlers::healthz))
            .route("/hostname", get(handlers::hostname))
            .route("/server-status", get(handlers::server_status))
            .route("/checkServerStatus", get(handlers::check_server_status))
            .route("/logs", get(handlers::logs))
            .route("/start-stress-test", post(handlers::start_stress_test))
            .fallback_service(static_files)
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                logging::access_log,
            ))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.address,
            ws_path = %self.config.relay.ws_path,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown trigger received");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
