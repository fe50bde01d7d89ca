//! Plain HTTP forwarding to the backend origin.
//!
//! # Responsibilities
//! - Forward method, headers and body verbatim to the single backend
//! - Rewrite only the Host header to the backend origin
//! - Relay the backend response (status, headers, body) back unchanged
//!
//! # Design Decisions
//! - Stateless passthrough: no retry, no queuing, no circuit breaking —
//!   appropriate to a single-backend deployment
//! - Backend unreachable maps to 502 Bad Gateway
//! - Bodies are streamed, never buffered

use std::str::FromStr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;

/// Forward one request to the backend origin.
pub async fn forward(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let backend_addr = &state.config.backend.address;
    let authority = match Authority::from_str(backend_addr) {
        Ok(a) => a,
        Err(e) => {
            // Validation catches this at startup; a failure here means the
            // config was constructed by hand.
            tracing::error!(backend = %backend_addr, error = %e, "invalid backend authority");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid backend address").into_response();
        }
    };

    let mut uri_parts = request.uri().clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(authority);
    let uri = match Uri::from_parts(uri_parts) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "failed to rewrite request uri");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid request uri").into_response();
        }
    };
    *request.uri_mut() = uri;

    // Host header follows the backend origin; everything else is verbatim.
    match header::HeaderValue::from_str(backend_addr) {
        Ok(host) => {
            request.headers_mut().insert(header::HOST, host);
        }
        Err(e) => {
            tracing::error!(backend = %backend_addr, error = %e, "backend address is not a valid host header");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid backend address").into_response();
        }
    }

    tracing::debug!(method = %method, path = %path, backend = %backend_addr, "forwarding request");

    match state.client.request(request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(&method, status.as_u16(), start_time);

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "upstream request failed");
            metrics::record_request(&method, 502, start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
