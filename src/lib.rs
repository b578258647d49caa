//! MROW - MessagePack RPC Over WebSocket
//!
//! This is the main convenience crate that re-exports all mrow
//! sub-crates. Use this crate if you want a single dependency providing
//! the wire model and the client.
//!
//! # Architecture
//!
//! mrow is organized into modular crates:
//!
//! - **mrow-core**: wire types, versioned envelope codec, error taxonomy
//! - **mrow-client**: the bidirectional RPC client over WebSocket
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mrow::ClientBuilder;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> mrow::Result<()> {
//!     let client = ClientBuilder::new("wss://rpc.example.net")
//!         .api_key("secret")
//!         .user_agent("test.client")
//!         .connect()
//!         .await?;
//!
//!     let contact: serde_json::Value = client
//!         .invoke("contact.get", Some(json!({"version": 0})))
//!         .await?;
//!     println!("contact: {}", contact);
//!
//!     Ok(())
//! }
//! ```

// Re-export all public APIs from sub-crates
// This allows users to access everything through the `mrow::` prefix
pub use mrow_client as client;
pub use mrow_core as core;

// Convenience re-exports of the most commonly used types
pub use mrow_client::{ClientBuilder, ConnectionHandler, ContactEventHandler, RpcClient};
pub use mrow_core::{Error, ErrorObject, Result, RpcEvent, RpcRequest, RpcResponse};
