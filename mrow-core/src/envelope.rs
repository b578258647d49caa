//! Versioned binary envelope codec
//!
//! Every frame on the wire is `[version byte] + MessagePack(document)`.
//! The single supported version is [`PROTOCOL_VERSION`]. The body is a
//! compact binary map/array/scalar encoding of a JSON-compatible
//! document; decoding goes through [`serde_json::Value`] so the rest of
//! the system only ever sees the JSON model.
//!
//! # Lossless Integers
//!
//! MessagePack integers decode as JSON integers. A document whose body
//! cannot be represented in the JSON model (raw binary, non-string map
//! keys, extension types) fails with `MalformedPayload` rather than
//! being silently coerced.
//!
//! # Failure Containment
//!
//! Both transforms are pure. All decode failures are recoverable: the
//! frame-handling path drops the offending frame and the connection
//! stays open.

use crate::error::{Error, Result};
use serde::Serialize;

/// The single supported envelope version
pub const PROTOCOL_VERSION: u8 = 0;

/// Encode a document into a versioned wire frame
///
/// Structs encode as MessagePack maps (named fields), matching the
/// JSON-document framing the server expects.
pub fn encode<T: Serialize>(doc: &T) -> Result<Vec<u8>> {
    let body = rmp_serde::to_vec_named(doc).map_err(|e| Error::Serialization(e.to_string()))?;
    let mut frame = Vec::with_capacity(body.len() + 1);
    frame.push(PROTOCOL_VERSION);
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a wire frame into a JSON document
///
/// Returns `Ok(None)` for zero-length input, which the protocol treats
/// as an ignorable keep-alive. Fails with `UnsupportedVersion` when the
/// leading byte is not [`PROTOCOL_VERSION`], and with `MalformedPayload`
/// when the body does not deserialize into the JSON value model.
pub fn decode(bytes: &[u8]) -> Result<Option<serde_json::Value>> {
    let Some((&version, body)) = bytes.split_first() else {
        return Ok(None);
    };

    if version != PROTOCOL_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let doc: serde_json::Value =
        rmp_serde::from_slice(body).map_err(|e| Error::MalformedPayload(e.to_string()))?;
    Ok(Some(doc))
}
