//! Shared utilities for integration testing: mock backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::Request,
    response::Response,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Start an HTTP backend that echoes what it received: method, path, the
/// Host header, and the body. Useful for asserting what arrives after the
/// proxy's rewrite.
pub async fn start_echo_http_backend(addr: SocketAddr) {
    let app = Router::new().fallback(any(echo_request));
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

async fn echo_request(request: Request<Body>) -> Json<Value> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let host = request
        .headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let body = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .unwrap_or_default();

    Json(json!({
        "method": method,
        "path": path,
        "host": host,
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Scripted frames for the WebSocket backend, one entry per connection:
/// each new connection receives the next script entry as text frames, then
/// the connection behaves as an echo until the peer closes.
#[derive(Clone)]
pub struct WsScript {
    frames_per_connection: Arc<Vec<Vec<&'static str>>>,
    connections: Arc<AtomicU32>,
}

impl WsScript {
    pub fn new(frames_per_connection: Vec<Vec<&'static str>>) -> Self {
        Self {
            frames_per_connection: Arc::new(frames_per_connection),
            connections: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn connection_count(&self) -> u32 {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Start a WebSocket backend on `path` following the given script.
pub async fn start_ws_backend(addr: SocketAddr, path: &'static str, script: WsScript) {
    let app = Router::new()
        .route(path, get(ws_upgrade))
        .with_state(script);
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

async fn ws_upgrade(State(script): State<WsScript>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_scripted_connection(socket, script))
}

async fn run_scripted_connection(mut socket: WebSocket, script: WsScript) {
    let index = script.connections.fetch_add(1, Ordering::SeqCst) as usize;
    let frames = script
        .frames_per_connection
        .get(index)
        .cloned()
        .unwrap_or_default();

    for frame in frames {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }

    // Echo until the peer goes away.
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

/// Start a WebSocket backend that sends one frame per connection and then
/// drops the connection, forcing the peer to reconnect for the next frame.
pub async fn start_dropping_ws_backend(
    addr: SocketAddr,
    path: &'static str,
    frames: Vec<&'static str>,
) -> WsScript {
    let script = WsScript::new(frames.into_iter().map(|f| vec![f]).collect());
    let app = Router::new()
        .route(path, get(dropping_upgrade))
        .with_state(script.clone());
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    script
}

async fn dropping_upgrade(State(script): State<WsScript>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |mut socket| async move {
        let index = script.connections.fetch_add(1, Ordering::SeqCst) as usize;
        if let Some(frames) = script.frames_per_connection.get(index) {
            for frame in frames {
                let _ = socket.send(Message::Text((*frame).into())).await;
            }
        }
        // Drop without a close handshake: the relay must treat it as a
        // terminal event.
    })
}
