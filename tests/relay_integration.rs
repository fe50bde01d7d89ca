//! End-to-end tests for the relay front end: HTTP forwarding, WebSocket
//! bridging, and the relay client's reconnect behavior.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite;

use relay_front::config::{ClientConfig, RelayConfig};
use relay_front::http::HttpServer;
use relay_front::lifecycle::Shutdown;
use relay_front::relay::RelayClient;

mod common;

/// Start the relay front end on `proxy_addr`, forwarding to `backend_addr`.
async fn start_front(proxy_addr: SocketAddr, backend_addr: SocketAddr) -> Shutdown {
    let mut config = RelayConfig::default();
    config.listener.bind_address = proxy_addr.to_string();
    config.backend.address = backend_addr.to_string();
    config.access_log.enabled = false;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let listener = TcpListener::bind(proxy_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}

/// Wait until the display region shows `expected`.
async fn wait_for_display(
    display: &mut watch::Receiver<String>,
    expected: &str,
    deadline: Duration,
) -> bool {
    let result = tokio::time::timeout(deadline, async {
        loop {
            if display.borrow().as_str() == expected {
                return;
            }
            if display.changed().await.is_err() {
                return;
            }
        }
    })
    .await;
    result.is_ok() && display.borrow().as_str() == expected
}

#[tokio::test]
async fn http_forward_rewrites_host_and_preserves_body() {
    let backend_addr: SocketAddr = "127.0.0.1:28481".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28482".parse().unwrap();

    common::start_echo_http_backend(backend_addr).await;
    let shutdown = start_front(proxy_addr, backend_addr).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(format!("http://{proxy_addr}/api/echo"))
        .header("host", "client-host")
        .body(r#"{"x":1}"#)
        .send()
        .await
        .expect("front end unreachable");

    assert_eq!(res.status(), 200);
    let seen: serde_json::Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "POST");
    assert_eq!(seen["path"], "/api/echo", "path must be preserved unmodified");
    assert_eq!(seen["body"], r#"{"x":1}"#, "body must arrive verbatim");
    assert_eq!(
        seen["host"],
        backend_addr.to_string(),
        "Host must be rewritten to the backend origin"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn ws_bridge_delivers_backend_frames_byte_for_byte() {
    let backend_addr: SocketAddr = "127.0.0.1:28483".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28484".parse().unwrap();

    let script = common::WsScript::new(vec![vec!["hello from backend"]]);
    common::start_ws_backend(backend_addr, "/api/ws", script).await;
    let shutdown = start_front(proxy_addr, backend_addr).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{proxy_addr}/api/ws"))
        .await
        .expect("upgrade through the relay should succeed");

    match ws.next().await {
        Some(Ok(tungstenite::Message::Text(text))) => {
            assert_eq!(text.as_str(), "hello from backend");
        }
        other => panic!("expected backend frame, got {other:?}"),
    }

    // Round-trip through both bridge directions, non-ASCII included.
    let payload = "relais-épreuve ✓";
    ws.send(tungstenite::Message::Text(payload.into()))
        .await
        .unwrap();
    match ws.next().await {
        Some(Ok(tungstenite::Message::Text(text))) => assert_eq!(text.as_str(), payload),
        other => panic!("expected echo frame, got {other:?}"),
    }

    let _ = ws.close(None).await;
    shutdown.trigger();
}

#[tokio::test]
async fn extra_prefixes_are_forwarded_to_the_backend() {
    let backend_addr: SocketAddr = "127.0.0.1:28492".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28493".parse().unwrap();

    common::start_echo_http_backend(backend_addr).await;
    let shutdown = start_front(proxy_addr, backend_addr).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("http://{proxy_addr}/was-server-status"))
        .send()
        .await
        .expect("front end unreachable");
    assert_eq!(res.status(), 200);
    let seen: serde_json::Value = res.json().await.unwrap();
    assert_eq!(seen["path"], "/was-server-status");
    assert_eq!(seen["host"], backend_addr.to_string());

    let res = client
        .post(format!("http://{proxy_addr}/products/add"))
        .body("name=widget")
        .send()
        .await
        .expect("front end unreachable");
    assert_eq!(res.status(), 200);
    let seen: serde_json::Value = res.json().await.unwrap();
    assert_eq!(seen["method"], "POST");
    assert_eq!(seen["path"], "/products/add");
    assert_eq!(seen["body"], "name=widget");

    shutdown.trigger();
}

#[tokio::test]
async fn backend_down_returns_bad_gateway() {
    let backend_addr: SocketAddr = "127.0.0.1:28486".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28485".parse().unwrap();

    // Nothing listens on the backend address.
    let shutdown = start_front(proxy_addr, backend_addr).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{proxy_addr}/api/anything"))
        .send()
        .await
        .expect("front end unreachable");

    assert_eq!(res.status(), 502);

    shutdown.trigger();
}

#[tokio::test]
async fn refused_upgrade_fails_handshake_promptly() {
    let backend_addr: SocketAddr = "127.0.0.1:28488".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28487".parse().unwrap();

    let shutdown = start_front(proxy_addr, backend_addr).await;

    let start = Instant::now();
    let result = tokio_tungstenite::connect_async(format!("ws://{proxy_addr}/api/ws")).await;

    match result {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 502);
        }
        other => panic!("expected handshake rejection, got {other:?}"),
    }
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "rejection must not wait on retries"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn relay_client_reconnects_after_dropped_connection() {
    let backend_addr: SocketAddr = "127.0.0.1:28489".parse().unwrap();

    // One frame per connection, then the backend drops the socket.
    let script =
        common::start_dropping_ws_backend(backend_addr, "/api/ws", vec!["frame-1", "frame-2"])
            .await;

    let config = ClientConfig {
        secure: false,
        host: "127.0.0.1".to_string(),
        port: 28489,
        path: "/api/ws".to_string(),
        reconnect_delay_ms: 100,
    };

    let shutdown = Shutdown::new();
    let (client, mut display) = RelayClient::new(config);
    let client_task = tokio::spawn(client.run(shutdown.subscribe()));

    assert!(
        wait_for_display(&mut display, "frame-2", Duration::from_secs(5)).await,
        "client must reconnect and receive the second connection's frame"
    );
    assert!(
        script.connection_count() >= 2,
        "the second frame only arrives on a new connection"
    );

    shutdown.trigger();
    let _ = client_task.await;
}

#[tokio::test]
async fn display_shows_last_frame_through_the_relay() {
    let backend_addr: SocketAddr = "127.0.0.1:28490".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28491".parse().unwrap();

    let script = common::WsScript::new(vec![vec!["A", "B"]]);
    common::start_ws_backend(backend_addr, "/api/ws", script).await;
    let server_shutdown = start_front(proxy_addr, backend_addr).await;

    let config = ClientConfig {
        secure: false,
        host: "127.0.0.1".to_string(),
        port: 28491,
        path: "/api/ws".to_string(),
        reconnect_delay_ms: 100,
    };

    let shutdown = Shutdown::new();
    let (client, mut display) = RelayClient::new(config);
    let client_task = tokio::spawn(client.run(shutdown.subscribe()));

    assert!(
        wait_for_display(&mut display, "B", Duration::from_secs(5)).await,
        "display must show the last frame, not the first"
    );

    shutdown.trigger();
    server_shutdown.trigger();
    let _ = client_task.await;
}
