//! Client builder for connection setup
//!
//! The builder carries everything the connection needs before it exists:
//! the endpoint, the two required handshake headers (API key and client
//! identifier), the default per-call timeout, and the lifecycle and
//! event handlers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mrow_client::ClientBuilder;
//! use serde_json::json;
//!
//! # async fn example() -> mrow_core::Result<()> {
//! let client = ClientBuilder::new("wss://rpc.example.net")
//!     .api_key("secret")
//!     .user_agent("test.client")
//!     .connect()
//!     .await?;
//!
//! let contact: serde_json::Value = client
//!     .invoke("contact.get", Some(json!({"version": 0})))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::client::{ConnectionHandler, DEFAULT_CALL_TIMEOUT};
use crate::connection_state::{ConnectionState, StateCell};
use crate::events::{ContactEventHandler, EventDispatcher};
use crate::pending::PendingCalls;
use crate::RpcClient;
use futures::StreamExt;
use mrow_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;

/// Builder for configuring and connecting an [`RpcClient`]
pub struct ClientBuilder {
    url: String,
    api_key: Option<String>,
    user_agent: Option<String>,
    default_timeout: Duration,
    connection_handler: Option<Arc<dyn ConnectionHandler>>,
    event_handler: Option<Arc<dyn ContactEventHandler>>,
}

impl ClientBuilder {
    /// Start a builder for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            user_agent: None,
            default_timeout: DEFAULT_CALL_TIMEOUT,
            connection_handler: None,
            event_handler: None,
        }
    }

    /// API key sent in the `api-key` handshake header
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Client identifier sent in the `user-agent` handshake header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Override the default 10 second per-call timeout used by `invoke`
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Attach a lifecycle listener
    pub fn connection_handler(mut self, handler: Arc<dyn ConnectionHandler>) -> Self {
        self.connection_handler = Some(handler);
        self
    }

    /// Attach the typed handler for server-pushed contact events
    pub fn event_handler(mut self, handler: Arc<dyn ContactEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Open the connection and spawn the receive loop
    pub async fn connect(self) -> Result<RpcClient> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| Error::Transport(e.to_string()))?;

        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| Error::Transport(format!("invalid api key header: {}", e)))?;
            request.headers_mut().insert("api-key", value);
        }
        if let Some(agent) = &self.user_agent {
            let value = HeaderValue::from_str(agent)
                .map_err(|e| Error::Transport(format!("invalid user agent header: {}", e)))?;
            request.headers_mut().insert("user-agent", value);
        }

        let state = StateCell::new();
        state.set(ConnectionState::Connecting);

        tracing::info!(url = %self.url, "connecting");
        let (ws_stream, _) = connect_async(request).await.map_err(|e| {
            state.set(ConnectionState::Failed);
            Error::Transport(e.to_string())
        })?;

        let (sender, receiver) = ws_stream.split();
        let sender = Arc::new(Mutex::new(sender));

        let pending = PendingCalls::new();
        let dispatcher = match self.event_handler {
            Some(handler) => EventDispatcher::with_handler(handler),
            None => EventDispatcher::new(),
        };

        state.set(ConnectionState::Open);
        tracing::info!("connected");
        if let Some(handler) = &self.connection_handler {
            handler.on_open();
        }

        tokio::spawn(RpcClient::receive_loop(
            receiver,
            pending.clone(),
            dispatcher,
            state.clone(),
            self.connection_handler,
        ));

        Ok(RpcClient {
            sender,
            pending,
            state,
            default_timeout: self.default_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new("ws://localhost:8080");
        assert_eq!(builder.url, "ws://localhost:8080");
        assert!(builder.api_key.is_none());
        assert!(builder.user_agent.is_none());
        assert_eq!(builder.default_timeout, DEFAULT_CALL_TIMEOUT);
        assert!(builder.connection_handler.is_none());
        assert!(builder.event_handler.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let builder = ClientBuilder::new("ws://localhost:8080")
            .api_key("key")
            .user_agent("test.client")
            .default_timeout(Duration::from_secs(2));

        assert_eq!(builder.api_key, Some("key".to_string()));
        assert_eq!(builder.user_agent, Some("test.client".to_string()));
        assert_eq!(builder.default_timeout, Duration::from_secs(2));
    }
}
