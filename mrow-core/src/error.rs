//! Error types for mrow
//!
//! Two error types live here:
//!
//! - **Error**: application-level errors for internal use (uses thiserror)
//! - **ErrorObject**: the wire-format error carried inside a response
//!
//! # Propagation Policy
//!
//! Envelope-decode failures (`UnsupportedVersion`, `MalformedPayload`) are
//! contained at the frame-handling path: the frame is logged and dropped,
//! the connection survives. Call-level failures (`Remote`, `InvalidFormat`)
//! are surfaced to the caller that issued the request. Transport faults
//! (`Transport`, `ConnectionClosed`) end the connection instance; the
//! lifecycle listener owns any reconnect policy.
//!
//! # Timeouts
//!
//! There is deliberately no `Timeout` variant. A call that times out
//! resolves to a synthetic [`RpcResponse`](crate::RpcResponse) carrying an
//! `ErrorObject` with code 0, keeping the call contract uniform.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for mrow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for mrow operations
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A send was attempted while the connection is not open.
    ///
    /// Fatal to that call, not to the connection.
    #[error("connection is not open")]
    NotConnected,

    /// Inbound frame carried a version byte other than the supported one
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u8),

    /// Inbound frame body is not valid MessagePack, or does not convert
    /// losslessly into the JSON value model
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Outbound document could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The server answered the request with an error object
    #[error("remote error: {0}")]
    Remote(#[from] ErrorObject),

    /// A result document did not match the shape the caller expected
    #[error("invalid result format: {0}")]
    InvalidFormat(String),

    /// A known event arrived with params that do not decode into its
    /// domain type. Indicates a protocol or version mismatch worth
    /// surfacing, unlike unknown event names which are ignored.
    #[error("malformed payload for event {method}: {reason}")]
    MalformedEventPayload {
        /// Protocol method name of the offending event
        method: String,
        /// Decode failure detail
        reason: String,
    },

    /// WebSocket transport layer error
    #[error("transport error: {0}")]
    Transport(String),

    /// The connection is gone and the call can no longer complete
    #[error("connection closed")]
    ConnectionClosed,
}

/// Wire-format error object, carried in the `error` field of a response
///
/// `{"message": string, "code": integer, "data": any?}` on the wire.
/// Code 0 is reserved by the client for synthesized timeout responses;
/// other codes are assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorObject {
    /// Human-readable error message
    pub message: String,
    /// Numeric error code
    pub code: i64,
    /// Optional additional error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorObject {
    /// Create a new error object with code and message
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            data: None,
        }
    }

    /// Create a new error object carrying additional data
    pub fn with_data(code: i64, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            code,
            data: Some(data),
        }
    }
}

impl std::fmt::Display for ErrorObject {
    /// Formats as "[code] message" for easy readability in logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorObject {}
