//! Operational status endpoints.
//!
//! Everything here is peripheral to the relay: host identity, resource
//! usage, the backend health ladder, access log retrieval, and the
//! stress-test trigger. Handlers probe on demand and hold no state.

pub mod handlers;
pub mod system;
