//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → websocket.rs (relay path: upgrade + bidirectional bridge)
//!     → proxy.rs (proxy namespace: verbatim forward, Host rewritten)
//!     → static page / status endpoints (everything else)
//! ```

pub mod proxy;
pub mod server;
pub mod session;
pub mod websocket;

pub use server::{AppState, HttpServer};
pub use session::{SessionGuard, SessionId};
