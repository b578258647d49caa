//! Connection state tracking
//!
//! # State Machine
//!
//! ```text
//! Disconnected → Connecting → Open → Closing → Closed
//!                                  ↘ Failed
//! ```
//!
//! `Closed` and `Failed` are terminal for a client instance. There is no
//! automatic reconnect at this layer: the lifecycle listener observes the
//! terminal state and owns any reconnect policy, constructing a fresh
//! client if it wants one.

use std::sync::{Arc, RwLock};

/// Connection lifecycle state, owned exclusively by the RPC connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state, no connection attempt yet
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Connected and able to send
    Open,
    /// Graceful shutdown in progress
    Closing,
    /// Closed after a completed close handshake (terminal)
    Closed,
    /// Torn down by a transport fault (terminal)
    Failed,
}

/// Shared cell holding the current state
///
/// Uses a std lock because the state is only ever touched for the
/// duration of a read or write, never across an await point.
#[derive(Clone)]
pub(crate) struct StateCell {
    inner: Arc<RwLock<ConnectionState>>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ConnectionState::Disconnected)),
        }
    }

    pub(crate) fn get(&self) -> ConnectionState {
        match self.inner.read() {
            Ok(guard) => *guard,
            // a poisoned lock still holds a valid Copy value
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        match self.inner.write() {
            Ok(mut guard) => *guard = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.get() == ConnectionState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), ConnectionState::Disconnected);

        cell.set(ConnectionState::Connecting);
        assert_eq!(cell.get(), ConnectionState::Connecting);

        cell.set(ConnectionState::Open);
        assert!(cell.is_open());

        cell.set(ConnectionState::Closing);
        assert!(!cell.is_open());

        cell.set(ConnectionState::Closed);
        assert_eq!(cell.get(), ConnectionState::Closed);
    }

    #[test]
    fn test_shared_between_clones() {
        let cell = StateCell::new();
        let other = cell.clone();
        cell.set(ConnectionState::Failed);
        assert_eq!(other.get(), ConnectionState::Failed);
    }
}
