//! Core wire types and envelope codec for mrow
//!
//! This crate holds everything about the protocol that does not touch a
//! socket: the versioned binary envelope ([`envelope`]), the three wire
//! message shapes ([`RpcRequest`], [`RpcResponse`], [`RpcEvent`]) with
//! structural classification ([`WireMessage`]), and the error taxonomy
//! ([`Error`], [`ErrorObject`]).
//!
//! The connection itself lives in `mrow-client`.

pub mod envelope;
pub mod error;
pub mod types;

pub use error::{Error, ErrorObject, Result};
pub use types::{RequestId, RpcEvent, RpcRequest, RpcResponse, WireMessage};
