//! Per-relay WebSocket server
//!
//! Each relay serves its MPEG-TS byte stream on its own port. Clients get the
//! jsmpeg stream header first (when the video size is known), then every
//! chunk ffmpeg writes, as binary messages.
//!
//! ```text
//!   ffmpeg stdout ──► pump ──► broadcast::Sender<Bytes>
//!                                   │
//!                    ┌──────────────┼──────────────┐
//!                    ▼              ▼              ▼
//!                 [client]       [client]       [client]
//! ```

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::Router;
use bytes::{BufMut, Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};

use crate::allocator::Endpoint;

/// Magic prefix of the jsmpeg stream header
pub const JSMPEG_MAGIC: &[u8; 4] = b"jsmp";

/// Video frame size reported by ffmpeg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDimensions {
    pub width: u16,
    pub height: u16,
}

/// Build the 8-byte jsmpeg stream header: magic, width (BE), height (BE)
pub fn stream_header(dimensions: VideoDimensions) -> Bytes {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_slice(JSMPEG_MAGIC);
    buf.put_u16(dimensions.width);
    buf.put_u16(dimensions.height);
    buf.freeze()
}

/// Shared state of one relay's WebSocket server
#[derive(Clone)]
pub struct RelayFeed {
    endpoint: Endpoint,
    tx: broadcast::Sender<Bytes>,
    dimensions: watch::Receiver<Option<VideoDimensions>>,
}

impl RelayFeed {
    pub fn new(
        endpoint: Endpoint,
        tx: broadcast::Sender<Bytes>,
        dimensions: watch::Receiver<Option<VideoDimensions>>,
    ) -> Self {
        Self {
            endpoint,
            tx,
            dimensions,
        }
    }

    /// Number of connected clients
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Router accepting WebSocket upgrades on any path
pub fn router(feed: RelayFeed) -> Router {
    Router::new().fallback(upgrade).with_state(feed)
}

async fn upgrade(ws: WebSocketUpgrade, State(feed): State<RelayFeed>) -> Response {
    ws.on_upgrade(move |socket| serve_client(socket, feed))
}

async fn serve_client(socket: WebSocket, feed: RelayFeed) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut rx = feed.tx.subscribe();

    tracing::debug!(
        endpoint = %feed.endpoint,
        clients = feed.client_count(),
        "Relay client connected"
    );

    let dimensions = *feed.dimensions.borrow();
    if let Some(dimensions) = dimensions {
        if ws_tx
            .send(Message::Binary(stream_header(dimensions)))
            .await
            .is_err()
        {
            return;
        }
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(chunk) => {
                        if ws_tx.send(Message::Binary(chunk)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            endpoint = %feed.endpoint,
                            skipped = n,
                            "Relay client lagging, chunks dropped"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_tx.send(Message::Pong(data)).await;
                    }
                    _ => {}
                }
            }
        }
    }

    tracing::debug!(endpoint = %feed.endpoint, "Relay client disconnected");
}
