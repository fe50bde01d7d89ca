//! Relay client connection state machine.
//!
//! # Responsibilities
//! - Track connection lifecycle (Idle → Connecting → Open → Closed → …)
//! - Hold the display region (last received text frame, last write wins)
//! - Schedule a fixed-delay reconnect for every terminal event
//!
//! # Design Decisions
//! - `handle_error` and `handle_close` are independent triggers: each arms
//!   its own reconnect timer. If both fire for the same failed attempt the
//!   session carries two armed timers and the second dial attempt is
//!   superseded by the first (`reconnect_fired` returns false once a dial is
//!   already under way). This mirrors the deployed behavior rather than
//!   deduplicating it; the armed-timer count makes it observable in tests.
//! - Fixed delay, no backoff growth, no retry cap: a permanently unreachable
//!   backend produces one attempt per delay interval forever.

use std::time::Duration;

/// Lifecycle state of the single client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection yet (before the first dial).
    Idle,
    /// A dial is in flight.
    Connecting,
    /// The connection is established.
    Open,
    /// The connection ended; a reconnect may be armed.
    Closed,
}

/// A reconnect timer to arm: sleep `delay`, then call
/// [`RelaySession::reconnect_fired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconnect {
    pub delay: Duration,
}

/// State machine for the relay client, one instance per client.
///
/// The driver owns the transport; this type owns policy. Every transport
/// event maps to exactly one handler call.
#[derive(Debug)]
pub struct RelaySession {
    state: ConnectionState,
    reconnect_delay: Duration,
    /// Display region: the raw payload of the last text frame, replacing
    /// prior content. No accumulation, no history.
    display: Option<String>,
    /// Reconnect timers armed but not yet fired.
    armed_reconnects: u32,
    frames_received: u64,
}

impl RelaySession {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Idle,
            reconnect_delay,
            display: None,
            armed_reconnects: 0,
            frames_received: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Current content of the display region.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Reconnect timers currently armed.
    pub fn armed_reconnects(&self) -> u32 {
        self.armed_reconnects
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Begin a dial. Only valid from `Idle` or `Closed`; the invariant is
    /// at most one active connection per client, so a dial while another
    /// connection exists is ignored.
    pub fn begin_connect(&mut self) -> bool {
        match self.state {
            ConnectionState::Idle | ConnectionState::Closed => {
                self.state = ConnectionState::Connecting;
                true
            }
            ConnectionState::Connecting | ConnectionState::Open => false,
        }
    }

    /// The dial succeeded.
    pub fn handle_open(&mut self) {
        tracing::info!("relay connection established");
        self.state = ConnectionState::Open;
    }

    /// An inbound text frame. Last write wins.
    pub fn handle_message(&mut self, payload: &str) {
        self.frames_received += 1;
        self.display = Some(payload.to_string());
    }

    /// A transport error (dial failure or mid-stream error).
    /// Arms a reconnect after the fixed delay.
    pub fn handle_error(&mut self) -> Reconnect {
        tracing::warn!(delay_ms = self.reconnect_delay.as_millis() as u64, "relay connection error");
        self.terminal_event()
    }

    /// The connection closed (clean close or stream end). Treated the same
    /// as a transport error: arms a reconnect after the fixed delay.
    pub fn handle_close(&mut self) -> Reconnect {
        tracing::info!(delay_ms = self.reconnect_delay.as_millis() as u64, "relay connection closed, reconnect scheduled");
        self.terminal_event()
    }

    fn terminal_event(&mut self) -> Reconnect {
        self.state = ConnectionState::Closed;
        self.armed_reconnects += 1;
        Reconnect {
            delay: self.reconnect_delay,
        }
    }

    /// An armed reconnect timer fired. Returns true if a dial should
    /// proceed; false if this timer was superseded (a dial from an earlier
    /// timer is already under way or the connection is back up).
    pub fn reconnect_fired(&mut self) -> bool {
        self.armed_reconnects = self.armed_reconnects.saturating_sub(1);
        self.begin_connect()
    }
}
