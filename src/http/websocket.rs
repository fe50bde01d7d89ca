//! WebSocket relay bridging.
//!
//! # Responsibilities
//! - Complete the upgrade handshake with the client
//! - Establish a WebSocket connection to the backend at the same path
//! - Bidirectional frame forwarding until either side closes
//!
//! # Data Flow
//! ```text
//! Client ←──── WebSocket frames ────→ Relay ←──── WebSocket frames ────→ Backend
//! ```
//!
//! # Design Decisions
//! - The backend is dialed before the upgrade completes: an unreachable
//!   backend fails the upgrade and the client-facing socket never opens
//! - Frame-level forwarding, no message buffering or inspection
//! - Close frames propagated in both directions; ping/pong passed through
//! - No retry on the server side: a dropped backend connection closes the
//!   client socket and the client's own reconnect policy takes over

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::CloseFrame as TsCloseFrame, Message as TsMessage},
    MaybeTlsStream, WebSocketStream,
};

use crate::http::server::AppState;
use crate::http::session::SessionGuard;
use crate::observability::metrics;

type BackendStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upgrade handler for the relay path.
///
/// Dials the backend at the same path the client requested (path preserved
/// unmodified, query included). Only when the backend accepted the upgrade
/// is the client handshake completed and the bridge spawned.
pub async fn handle_upgrade(
    State(state): State<AppState>,
    uri: Uri,
    ws: WebSocketUpgrade,
) -> Response {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    let backend_url = format!("ws://{}{}", state.config.backend.address, path);

    let connect_timeout = Duration::from_secs(state.config.timeouts.connect_secs);
    let backend = match timeout(connect_timeout, connect_async(&backend_url)).await {
        Ok(Ok((stream, _))) => stream,
        Ok(Err(e)) => {
            tracing::warn!(backend_url = %backend_url, error = %e, "backend refused websocket upgrade");
            return (StatusCode::BAD_GATEWAY, "Backend upgrade failed").into_response();
        }
        Err(_) => {
            tracing::warn!(backend_url = %backend_url, "backend websocket dial timed out");
            return (StatusCode::BAD_GATEWAY, "Backend upgrade timed out").into_response();
        }
    };

    ws.on_upgrade(move |socket| bridge(socket, backend))
}

/// Splice the client and backend streams together until either side closes.
async fn bridge(client: WebSocket, backend: BackendStream) {
    let guard = SessionGuard::new();
    let session_id = guard.id();
    tracing::debug!(session_id = %session_id, "bridge started");

    let (mut client_tx, mut client_rx) = client.split();
    let (mut backend_tx, mut backend_rx) = backend.split();

    loop {
        tokio::select! {
            msg = client_rx.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        let closing = matches!(msg, Message::Close(_));
                        if let Some(forward) = client_to_backend(msg) {
                            metrics::record_ws_frame("client_to_backend");
                            if backend_tx.send(forward).await.is_err() {
                                break;
                            }
                        }
                        if closing {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "client stream error");
                        let _ = backend_tx.send(TsMessage::Close(None)).await;
                        break;
                    }
                    None => {
                        let _ = backend_tx.send(TsMessage::Close(None)).await;
                        break;
                    }
                }
            }
            msg = backend_rx.next() => {
                match msg {
                    Some(Ok(msg)) => {
                        let closing = matches!(msg, TsMessage::Close(_));
                        if let Some(forward) = backend_to_client(msg) {
                            metrics::record_ws_frame("backend_to_client");
                            if client_tx.send(forward).await.is_err() {
                                break;
                            }
                        }
                        if closing {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "backend stream error");
                        let _ = client_tx.send(Message::Close(None)).await;
                        break;
                    }
                    None => {
                        let _ = client_tx.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    tracing::debug!(session_id = %session_id, "bridge ended");
}

/// Map a client frame onto the backend transport. Payloads pass through
/// unmodified.
fn client_to_backend(msg: Message) -> Option<TsMessage> {
    match msg {
        Message::Text(text) => Some(TsMessage::Text(text.as_str().into())),
        Message::Binary(data) => Some(TsMessage::Binary(data)),
        Message::Ping(data) => Some(TsMessage::Ping(data)),
        Message::Pong(data) => Some(TsMessage::Pong(data)),
        Message::Close(frame) => Some(TsMessage::Close(frame.map(|f| TsCloseFrame {
            code: f.code.into(),
            reason: f.reason.as_str().into(),
        }))),
    }
}

/// Map a backend frame onto the client transport.
fn backend_to_client(msg: TsMessage) -> Option<Message> {
    match msg {
        TsMessage::Text(text) => Some(Message::Text(text.as_str().into())),
        TsMessage::Binary(data) => Some(Message::Binary(data)),
        TsMessage::Ping(data) => Some(Message::Ping(data)),
        TsMessage::Pong(data) => Some(Message::Pong(data)),
        TsMessage::Close(frame) => Some(Message::Close(frame.map(|f| CloseFrame {
            code: f.code.into(),
            reason: f.reason.as_str().into(),
        }))),
        // Raw frames never surface from a read.
        TsMessage::Frame(_) => None,
    }
}
