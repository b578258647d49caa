//! Common test utilities for mrow-client integration tests
//!
//! Provides a mock WebSocket server speaking the binary envelope
//! protocol, so client behavior can be tested without a real server.

// not every test binary uses every helper
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Install a log subscriber honoring RUST_LOG, once per test binary
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mock WebSocket server for client testing
///
/// Accepts one connection at a time, records every binary frame it
/// receives, optionally answers through a handler function, and can
/// push unsolicited frames (server events) to the connected client.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    push_tx: mpsc::Sender<Vec<u8>>,
    frame_rx: mpsc::Receiver<Vec<u8>>,
}

impl MockWsServer {
    /// Start a server that records frames but never replies
    pub async fn silent() -> Self {
        Self::with_handler(|_frame| async move { None }).await
    }

    /// Start a server answering each binary frame through `handler`
    ///
    /// The handler receives the raw frame and may return a raw frame to
    /// send back, or None to stay quiet.
    pub async fn with_handler<F, Fut>(handler: F) -> Self
    where
        F: Fn(Vec<u8>) -> Fut + Send + 'static,
        Fut: Future<Output = Option<Vec<u8>>> + Send,
    {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (push_tx, mut push_rx) = mpsc::channel::<Vec<u8>>(32);
        let (frame_tx, frame_rx) = mpsc::channel::<Vec<u8>>(100);

        tokio::spawn(async move {
            loop {
                let stream = tokio::select! {
                    _ = shutdown_rx.recv() => return,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, _)) => stream,
                        Err(_) => return,
                    },
                };

                let Ok(ws_stream) = accept_async(stream).await else {
                    continue;
                };
                let (mut write, mut read) = ws_stream.split();

                loop {
                    tokio::select! {
                        _ = shutdown_rx.recv() => return,
                        pushed = push_rx.recv() => {
                            match pushed {
                                Some(frame) => {
                                    let _ = write.send(Message::Binary(frame)).await;
                                }
                                None => return,
                            }
                        }
                        incoming = read.next() => {
                            match incoming {
                                Some(Ok(Message::Binary(bytes))) => {
                                    let _ = frame_tx.send(bytes.clone()).await;
                                    if let Some(reply) = handler(bytes).await {
                                        let _ = write.send(Message::Binary(reply)).await;
                                    }
                                }
                                Some(Ok(Message::Close(frame))) => {
                                    // complete the close handshake: echo the
                                    // close, flush it onto the wire, and drain
                                    // the stream so the peer sees the reply
                                    // before the socket drops
                                    let _ = write.send(Message::Close(frame)).await;
                                    let _ = write.flush().await;
                                    while let Some(msg) = read.next().await {
                                        if msg.is_err() {
                                            break;
                                        }
                                    }
                                    break;
                                }
                                Some(Ok(_)) => {}
                                Some(Err(_)) | None => break,
                            }
                        }
                    }
                }
            }
        });

        // give the listener a moment to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        Self {
            addr,
            shutdown_tx,
            push_tx,
            frame_rx,
        }
    }

    /// WebSocket URL for connecting to this server
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Push an unsolicited frame to the connected client
    pub async fn push(&self, frame: Vec<u8>) {
        self.push_tx.send(frame).await.unwrap();
    }

    /// Wait for the next binary frame received by the server
    pub async fn wait_for_frame(&mut self) -> Option<Vec<u8>> {
        tokio::time::timeout(tokio::time::Duration::from_secs(5), self.frame_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Drop the connection and stop the server without a close handshake
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
