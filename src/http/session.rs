//! Bridge session lifecycle tracking.
//!
//! # Responsibilities
//! - Generate unique session IDs for tracing each proxied WebSocket bridge
//! - Keep the active-session gauge accurate via a drop guard
//!
//! Proxied bridges share nothing with each other; the counter exists only
//! for observability.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counter for session IDs.
/// Relaxed ordering is sufficient since we only need uniqueness.
static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one proxied WebSocket bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new() -> Self {
        Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ws-{}", self.0)
    }
}

/// Guard that tracks a bridge's lifetime.
/// Decrements the active-session gauge when dropped.
#[derive(Debug)]
pub struct SessionGuard {
    id: SessionId,
}

impl SessionGuard {
    pub fn new() -> Self {
        let id = SessionId::new();
        crate::observability::metrics::ws_session_started();
        tracing::debug!(session_id = %id, "bridge session opened");
        Self { id }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        crate::observability::metrics::ws_session_ended();
        tracing::debug!(session_id = %self.id, "bridge session closed");
    }
}
