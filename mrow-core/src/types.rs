//! Wire message types
//!
//! Three message shapes travel inside the envelope, all encoded as
//! MessagePack maps of a JSON-compatible document:
//!
//! 1. **Request**: `{"method": string, "params": object?, "id": integer?}`
//! 2. **Response**: `{"id": integer, "result": any?, "error": object?}`
//! 3. **Event**: `{"method": string, "params": object?}` (no id)
//!
//! An inbound frame is classified purely structurally: the presence of a
//! `"method"` key marks an event, everything else must be a response with
//! an integer `"id"`. See [`WireMessage::classify`].
//!
//! # Request IDs
//!
//! IDs are positive integers allocated by the connection, starting at 1
//! and never repeating for the lifetime of the client. A request built
//! before sending has no id yet; the connection assigns one.

use crate::error::{Error, ErrorObject, Result};
use serde::{Deserialize, Serialize};

/// Request identifier, unique per in-flight call
pub type RequestId = u64;

/// An outgoing RPC request
///
/// Immutable after construction. `params` and `id` are skipped on the
/// wire when absent, matching the compact framing the server expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    /// Name of the remote method to invoke, dot-namespaced
    pub method: String,
    /// Optional structured parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Correlation id, absent only before the connection assigns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl RpcRequest {
    /// Create a request with no id assigned yet
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Create a request with its correlation id already assigned
    pub fn with_id(
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        id: RequestId,
    ) -> Self {
        Self {
            method: method.into(),
            params,
            id: Some(id),
        }
    }
}

/// An inbound RPC response
///
/// Carries either a result or an error. Malformed input may technically
/// carry both; callers must check `error` first, which is what
/// [`is_error`](Self::is_error) and the invocation layer do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    /// Id of the originating request
    pub id: RequestId,
    /// Successful result document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error object returned in place of a result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl RpcResponse {
    /// Create a successful response
    pub fn success(result: serde_json::Value, id: RequestId) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(error: ErrorObject, id: RequestId) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Synthetic response fulfilling a call whose deadline elapsed
    ///
    /// Keeps the call contract uniform: a timeout is delivered as a
    /// response carrying an error with code 0, not as a thrown fault.
    pub fn timeout(id: RequestId) -> Self {
        Self::error(
            ErrorObject::new(
                0,
                format!("Timeout happened during sending command with id: {}", id),
            ),
            id,
        )
    }

    /// Check if the response carries an error object
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A server-pushed event
///
/// Distinguished from a response purely by the presence of a `"method"`
/// key and the absence of response framing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcEvent {
    /// Dot-namespaced event name, e.g. "contact.updated"
    pub method: String,
    /// Event payload; required by the protocol for all known events,
    /// but tolerated as absent on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// A classified inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    /// Reply to an in-flight request
    Response(RpcResponse),
    /// Out-of-band server-pushed event
    Event(RpcEvent),
}

impl WireMessage {
    /// Classify a decoded document as a response or an event
    ///
    /// A document with a `"method"` key is an event; anything else must
    /// decode as a response with an integer id. Non-object documents and
    /// responses without a usable id fail with `MalformedPayload`.
    pub fn classify(doc: serde_json::Value) -> Result<Self> {
        let Some(object) = doc.as_object() else {
            return Err(Error::MalformedPayload(format!(
                "expected a map, got: {}",
                doc
            )));
        };

        if object.contains_key("method") {
            let event: RpcEvent =
                serde_json::from_value(doc).map_err(|e| Error::MalformedPayload(e.to_string()))?;
            Ok(WireMessage::Event(event))
        } else {
            let response: RpcResponse =
                serde_json::from_value(doc).map_err(|e| Error::MalformedPayload(e.to_string()))?;
            Ok(WireMessage::Response(response))
        }
    }
}
