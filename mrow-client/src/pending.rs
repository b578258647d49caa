//! Pending-call bookkeeping
//!
//! Tracks every in-flight request from the moment it is sent until its
//! response arrives or its deadline elapses.
//!
//! # Call Lifecycle
//!
//! 1. **Allocate**: assign the next request id
//! 2. **Register**: create a oneshot channel keyed by the id
//! 3. **Send**: the connection writes the encoded frame
//! 4. **Wait**: the caller awaits the oneshot receiver under a timeout
//! 5. **Resolve or expire**: an inbound response fulfills the entry, or
//!    the caller's timeout removes it and synthesizes a timeout response
//!
//! # Exactly-Once Fulfillment
//!
//! Removing the map entry is the single arbiter of the resolve/timeout
//! race: whichever side removes the entry owns the outcome, the loser is
//! a no-op. A response for an id with no live entry (late, duplicate, or
//! unknown) is silently dropped.

use mrow_core::{RequestId, RpcResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

/// Registry of in-flight calls plus the request id allocator
///
/// Cheaply cloneable; all clones share the same map and counter. The
/// internal mutex is the one shared-mutable-state boundary of the
/// client: register, resolve, and remove all serialize through it.
#[derive(Clone)]
pub struct PendingCalls {
    /// Map of request id to the suspension handle awaiting its response
    pending: Arc<Mutex<HashMap<RequestId, oneshot::Sender<RpcResponse>>>>,
    /// Counter behind the monotonically increasing id sequence
    counter: Arc<Mutex<RequestId>>,
}

impl PendingCalls {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            counter: Arc::new(Mutex::new(0)),
        }
    }

    /// Allocate the next request id
    ///
    /// Ids are positive, start at 1, and never repeat for the lifetime
    /// of the client. Wraparound at u64 width is not handled.
    pub async fn next_id(&self) -> RequestId {
        let mut counter = self.counter.lock().await;
        *counter += 1;
        *counter
    }

    /// Register a pending call, returning the handle to await on
    pub async fn register(&self, id: RequestId) -> oneshot::Receiver<RpcResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);
        rx
    }

    /// Fulfill a pending call with an inbound response
    ///
    /// An id with no live entry means the call already timed out or the
    /// response is a duplicate; both are dropped without error.
    pub async fn resolve(&self, id: RequestId, response: RpcResponse) {
        if let Some(tx) = self.pending.lock().await.remove(&id) {
            // the receiver may have been dropped concurrently; fine either way
            let _ = tx.send(response);
        } else {
            tracing::debug!(id, "dropping response with no pending call");
        }
    }

    /// Remove a pending call without fulfilling it
    ///
    /// Returns true if the entry was still live. Used by the timeout
    /// path: a false return means an inbound response won the race.
    pub async fn remove(&self, id: RequestId) -> bool {
        self.pending.lock().await.remove(&id).is_some()
    }

    /// Drop every pending call, waking all waiters with a closed channel
    ///
    /// Called when the connection is lost; each suspended `send` then
    /// fails with `ConnectionClosed`.
    pub async fn abort_all(&self) {
        self.pending.lock().await.clear();
    }

    /// Number of calls currently in flight
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::new()
    }
}
