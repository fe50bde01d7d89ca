//! Relay client subsystem.
//!
//! # Data Flow
//! ```text
//! relay endpoint (ws[s]://host:port/api/ws)
//!     → client.rs (dial, pump frames, fixed-delay reconnect)
//!     → session.rs (lifecycle state, display region, reconnect policy)
//!     → watch channel (latest text frame, last write wins)
//! ```
//!
//! # Design Decisions
//! - Transport errors and clean closes are treated identically: both arm a
//!   reconnect after the same fixed delay
//! - Policy lives in `RelaySession` (pure, unit-testable); I/O lives in
//!   `RelayClient`

pub mod client;
pub mod session;

pub use client::{endpoint_url, RelayClient, RelayError};
pub use session::{ConnectionState, Reconnect, RelaySession};
