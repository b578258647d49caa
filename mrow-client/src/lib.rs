//! Bidirectional MessagePack RPC client over WebSocket
//!
//! This crate provides an RPC client that multiplexes many concurrent
//! request/response exchanges and server-pushed events over a single
//! persistent WebSocket connection. Frames are compact binary envelopes:
//! a one-byte protocol version followed by a MessagePack-encoded JSON
//! document (see `mrow-core`).
//!
//! # Core Pieces
//!
//! - **Connection**: [`RpcClient`] owns the socket, sends encoded
//!   requests, and routes inbound frames to calls or events
//! - **Pending calls**: each in-flight request suspends its caller until
//!   its response arrives or the deadline elapses
//! - **Typed invocation**: [`RpcClient::invoke`] decodes results
//!   strictly; [`ResultParser`] lets a call site pick its own decoding
//! - **Events**: [`EventDispatcher`] maps event names onto
//!   [`EventKind`] and hands decoded domain objects to a
//!   [`ContactEventHandler`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mrow_client::ClientBuilder;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> mrow_core::Result<()> {
//!     let client = ClientBuilder::new("wss://rpc.example.net")
//!         .api_key("secret")
//!         .user_agent("test.client")
//!         .connect()
//!         .await?;
//!
//!     let result: serde_json::Value = client
//!         .invoke("contact.get", Some(json!({"version": 0})))
//!         .await?;
//!     println!("contact: {}", result);
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod client_builder;
mod connection_state;
mod events;
mod parser;
mod pending;

pub use client::{ConnectionHandler, RpcClient, DEFAULT_CALL_TIMEOUT};
pub use client_builder::ClientBuilder;
pub use connection_state::ConnectionState;
pub use events::{Contact, ContactEventHandler, EventDispatcher, EventKind};
pub use parser::{ResultParser, TypedParser, ValueParser};
pub use pending::PendingCalls;
