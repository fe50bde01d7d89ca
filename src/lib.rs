//! Relay front end library.
//!
//! A small web front end that serves a static page and relays HTTP and
//! WebSocket traffic to a single backend origin. The interesting part is
//! the resilient WebSocket relay: the server side is a stateless
//! bidirectional bridge, and the client side owns the reconnect policy
//! (fixed delay, retry forever).

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod status;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::RelayClient;
