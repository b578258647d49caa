//! Result parsers for the typed invocation layer
//!
//! Every call site picks how the response's `result` document becomes a
//! typed value: an explicit decode function selected by the caller, never
//! an unchecked cast. [`TypedParser`] is the default strict path;
//! [`ValueParser`] is the loose escape hatch that hands back the raw
//! document.

use mrow_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Strategy for decoding a response's `result` document
pub trait ResultParser {
    /// The typed value produced on success
    type Output;

    /// Decode the result document
    ///
    /// Fails with `InvalidFormat` when the document's shape does not
    /// match the expected type.
    fn parse(&self, result: serde_json::Value) -> Result<Self::Output>;
}

/// Strict parser decoding the result into any deserializable type
pub struct TypedParser<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedParser<T> {
    /// Create a parser for `T`
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ResultParser for TypedParser<T> {
    type Output = T;

    fn parse(&self, result: serde_json::Value) -> Result<T> {
        serde_json::from_value(result).map_err(|e| Error::InvalidFormat(e.to_string()))
    }
}

/// Opaque parser returning the result document untouched
///
/// Low-level escape hatch for callers that want to inspect the raw
/// document themselves. Prefer [`TypedParser`] at normal call sites.
pub struct ValueParser;

impl ResultParser for ValueParser {
    type Output = serde_json::Value;

    fn parse(&self, result: serde_json::Value) -> Result<serde_json::Value> {
        Ok(result)
    }
}
