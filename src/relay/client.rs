//! Relay client: maintains a best-effort live connection to the relay
//! endpoint and publishes inbound text frames to a display channel.
//!
//! One cooperative task drives one connection at a time. Every terminal
//! event (transport error or clean close) schedules a reconnect after the
//! configured fixed delay; the task retries indefinitely.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::relay::session::RelaySession;

/// Timeout for a single dial attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for relay client operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("connection timed out")]
    ConnectTimeout,

    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

/// How one connection attempt ended.
enum Exit {
    /// The peer closed the connection or the stream ended.
    Closed,
    /// Shutdown was requested; stop retrying.
    Shutdown,
}

/// Build the relay endpoint URL from the client configuration.
///
/// The scheme follows the hosting page: `wss` when the page was loaded
/// securely, `ws` otherwise; host and port are the page's own.
pub fn endpoint_url(config: &ClientConfig) -> String {
    let scheme = if config.secure { "wss" } else { "ws" };
    format!(
        "{scheme}://{host}:{port}{path}",
        host = config.host,
        port = config.port,
        path = config.path
    )
}

/// Relay client with auto-reconnect.
pub struct RelayClient {
    config: ClientConfig,
    display_tx: watch::Sender<String>,
}

impl RelayClient {
    /// Create a new relay client.
    ///
    /// Returns the client and the display receiver: a watch channel holding
    /// the most recent text frame (last write wins, no history).
    pub fn new(config: ClientConfig) -> (Self, watch::Receiver<String>) {
        let (display_tx, display_rx) = watch::channel(String::new());
        (Self { config, display_tx }, display_rx)
    }

    /// Run the client until shutdown, reconnecting on every failure.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let url = endpoint_url(&self.config);
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);
        let mut session = RelaySession::new(delay);

        session.begin_connect();
        loop {
            let reconnect = match self.connect_and_run(&url, &mut session, &mut shutdown).await {
                Ok(Exit::Shutdown) => break,
                Ok(Exit::Closed) => session.handle_close(),
                Err(e) => {
                    warn!(url = %url, error = %e, "relay connection failed");
                    session.handle_error()
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(reconnect.delay) => {}
                _ = shutdown.recv() => break,
            }

            // This driver handles one terminal event per connection, so the
            // timer that just elapsed is the only one armed.
            let dialing = session.reconnect_fired();
            debug_assert!(dialing, "exactly one reconnect timer armed per connection");
        }

        info!("relay client stopped");
    }

    /// Dial the endpoint and pump frames until the connection ends.
    async fn connect_and_run(
        &self,
        url: &str,
        session: &mut RelaySession,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<Exit, RelayError> {
        debug!(url = %url, "dialing relay endpoint");

        let (ws_stream, _) = timeout(CONNECT_TIMEOUT, connect_async(url))
            .await
            .map_err(|_| RelayError::ConnectTimeout)??;

        session.handle_open();
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            session.handle_message(text.as_str());
                            // Replace prior content in the display region.
                            self.display_tx.send_replace(text.as_str().to_string());
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "relay endpoint sent close frame");
                            return Ok(Exit::Closed);
                        }
                        Some(Ok(_)) => {
                            // Binary, pong and raw frames carry nothing for
                            // the display region.
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(Exit::Closed),
                    }
                }
                _ = shutdown.recv() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(Exit::Shutdown);
                }
            }
        }
    }
}
