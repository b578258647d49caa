//! Bidirectional RPC client over WebSocket
//!
//! `RpcClient` owns the transport connection and is the sole writer and
//! reader of the pending-call registry and connection state. Many
//! concurrent request/response exchanges and out-of-band server events
//! are multiplexed over the single connection: a spawned receive loop
//! decodes every inbound frame, resolves responses against the registry,
//! and forwards events to the typed dispatcher.
//!
//! # Cloning
//!
//! `RpcClient` is cheaply cloneable using `Arc` internally. All clones
//! share the same connection; any number of tasks may call
//! [`invoke`](RpcClient::invoke) concurrently.
//!
//! # Lifetime
//!
//! `Closed` and `Failed` are terminal. The client never reconnects on
//! its own; the [`ConnectionHandler`] observes the terminal transition
//! and decides whether to build a new client.

use crate::connection_state::{ConnectionState, StateCell};
use crate::events::EventDispatcher;
use crate::parser::{ResultParser, TypedParser, ValueParser};
use crate::pending::PendingCalls;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use mrow_core::{envelope, Error, Result, RpcRequest, RpcResponse, WireMessage};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Default per-call deadline when none is given
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
pub(crate) type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Listener for connection lifecycle transitions
///
/// All methods default to no-ops so implementors only override what they
/// care about. Callbacks run on the receive loop and must not block.
pub trait ConnectionHandler: Send + Sync {
    /// The connection completed its handshake and is usable
    fn on_open(&self) {}
    /// The peer initiated a close handshake
    fn on_closing(&self, _code: u16, _reason: &str) {}
    /// The close handshake completed; the client is spent
    fn on_closed(&self, _code: u16, _reason: &str) {}
    /// The transport failed; the client is spent
    fn on_failure(&self, _error: &Error) {}
}

/// RPC client multiplexing calls and events over one WebSocket
#[derive(Clone)]
pub struct RpcClient {
    /// WebSocket write half, shared by all clones
    pub(crate) sender: Arc<Mutex<WsSink>>,
    /// In-flight call registry and id allocator
    pub(crate) pending: PendingCalls,
    /// Connection lifecycle state
    pub(crate) state: StateCell,
    /// Deadline applied by `invoke`
    pub(crate) default_timeout: Duration,
}

impl RpcClient {
    /// Connect with the two required headers and no handlers
    ///
    /// Shorthand for the [`ClientBuilder`](crate::ClientBuilder) path;
    /// use the builder to attach lifecycle or event handlers.
    pub async fn connect(url: &str, api_key: &str, user_agent: &str) -> Result<Self> {
        crate::ClientBuilder::new(url)
            .api_key(api_key)
            .user_agent(user_agent)
            .connect()
            .await
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Check whether the connection is open for sending
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Number of calls currently awaiting a response
    pub async fn in_flight(&self) -> usize {
        self.pending.len().await
    }

    /// Send a request and wait for its response or the timeout
    ///
    /// Fails immediately with `NotConnected` unless the connection is
    /// open. A call whose deadline elapses resolves to the synthetic
    /// timeout response rather than an error, so the return contract is
    /// uniform. The registry entry is removed before returning no matter
    /// the outcome.
    pub async fn send(
        &self,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<RpcResponse> {
        if !self.state.is_open() {
            return Err(Error::NotConnected);
        }

        let id = self.pending.next_id().await;
        let request = RpcRequest::with_id(method, params, id);
        let frame = envelope::encode(&request)?;

        let mut rx = self.pending.register(id).await;

        tracing::debug!(id, method = %request.method, bytes = frame.len(), "sending request");
        if let Err(e) = self.sender.lock().await.send(Message::Binary(frame)).await {
            self.pending.remove(id).await;
            return Err(Error::Transport(e.to_string()));
        }

        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(response)) => Ok(response),
            // sender dropped: the connection went down and aborted us
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_elapsed) => {
                if self.pending.remove(id).await {
                    tracing::debug!(id, "request timed out");
                    Ok(RpcResponse::timeout(id))
                } else {
                    // the response won the race against the deadline
                    rx.try_recv().map_err(|_| Error::ConnectionClosed)
                }
            }
        }
    }

    /// Invoke a remote method, decoding the result strictly into `R`
    ///
    /// Uses the client's default timeout. A response carrying an error
    /// object fails with `Remote` before any parsing happens; this
    /// includes timed-out calls, whose synthetic response carries the
    /// code 0 timeout error.
    pub async fn invoke<R: DeserializeOwned>(
        &self,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Result<R> {
        self.invoke_with(method, params, &TypedParser::new()).await
    }

    /// Invoke a remote method with a caller-supplied result parser
    pub async fn invoke_with<P: ResultParser>(
        &self,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        parser: &P,
    ) -> Result<P::Output> {
        let response = self.send(method, params, self.default_timeout).await?;

        if let Some(error) = response.error {
            tracing::debug!(id = response.id, error = %error, "request failed remotely");
            return Err(Error::Remote(error));
        }

        parser.parse(response.result.unwrap_or(serde_json::Value::Null))
    }

    /// Invoke a remote method, returning the raw result document
    ///
    /// Low-level escape hatch; prefer [`invoke`](Self::invoke).
    pub async fn invoke_raw(
        &self,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.invoke_with(method, params, &ValueParser).await
    }

    /// Request a graceful shutdown
    ///
    /// Sends a close frame with the normal-closure code when the
    /// connection is open; otherwise a no-op. The terminal state is
    /// reached once the peer completes the close handshake.
    pub async fn close(&self) -> Result<()> {
        if self.state.get() != ConnectionState::Open {
            return Ok(());
        }
        self.state.set(ConnectionState::Closing);

        tracing::debug!("closing connection");
        self.sender
            .lock()
            .await
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "close".into(),
            })))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    /// Inbound side of the connection, one instance per client
    ///
    /// Runs until the stream ends. Every registry mutation on the
    /// inbound path goes through here, so frame handling is effectively
    /// single-threaded with respect to resolution.
    pub(crate) async fn receive_loop(
        mut receiver: WsStream,
        pending: PendingCalls,
        dispatcher: EventDispatcher,
        state: StateCell,
        handler: Option<Arc<dyn ConnectionHandler>>,
    ) {
        let mut close_frame: Option<(u16, String)> = None;

        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Binary(bytes)) => {
                    Self::handle_frame(&bytes, &pending, &dispatcher).await;
                }
                Ok(Message::Close(frame)) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.into_owned()))
                        .unwrap_or((1005, String::new()));
                    tracing::debug!(code, reason = %reason, "peer closing connection");
                    state.set(ConnectionState::Closing);
                    if let Some(h) = &handler {
                        h.on_closing(code, &reason);
                    }
                    close_frame = Some((code, reason));
                }
                // pings are answered by the transport; text frames are
                // not part of this protocol
                Ok(_) => {}
                Err(e) => {
                    let error = Error::Transport(e.to_string());
                    tracing::warn!(error = %error, "transport failure");
                    state.set(ConnectionState::Failed);
                    if let Some(h) = &handler {
                        h.on_failure(&error);
                    }
                    pending.abort_all().await;
                    return;
                }
            }
        }

        // stream exhausted: a completed close handshake ends in Closed,
        // an abrupt drop without one is a failure
        match close_frame {
            Some((code, reason)) => {
                state.set(ConnectionState::Closed);
                if let Some(h) = &handler {
                    h.on_closed(code, &reason);
                }
            }
            None => {
                let error = Error::Transport("connection terminated without close handshake".into());
                tracing::warn!(error = %error, "connection lost");
                state.set(ConnectionState::Failed);
                if let Some(h) = &handler {
                    h.on_failure(&error);
                }
            }
        }
        pending.abort_all().await;
    }

    /// Decode, classify, and route one inbound frame
    ///
    /// Every failure here is contained: the frame is logged and dropped,
    /// other in-flight calls are unaffected, the connection stays open.
    async fn handle_frame(bytes: &[u8], pending: &PendingCalls, dispatcher: &EventDispatcher) {
        let doc = match envelope::decode(bytes) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::trace!("ignoring zero-length frame");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, bytes = bytes.len(), "dropping undecodable frame");
                return;
            }
        };

        match WireMessage::classify(doc) {
            Ok(WireMessage::Response(response)) => {
                pending.resolve(response.id, response).await;
            }
            Ok(WireMessage::Event(event)) => {
                tracing::debug!(method = %event.method, "event received");
                if let Err(e) = dispatcher.dispatch(event) {
                    tracing::warn!(error = %e, "event dispatch failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping unclassifiable frame");
            }
        }
    }
}
