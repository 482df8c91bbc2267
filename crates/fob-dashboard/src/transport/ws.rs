//! WebSocket transport.
//!
//! Each event is one text frame holding a JSON [`Frame`]. Non-text frames are
//! skipped; tungstenite answers pings on its own.

use super::{Connection, Endpoint, EventSink, EventStream, Frame, Transport};
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, connect_async};

/// Transport that dials the display over `ws://host:port`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection> {
        let (socket, _response) = connect_async(endpoint.ws_url()).await.map_err(|e| {
            DashboardError::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })?;

        let (sink, stream) = split_socket(socket);
        Ok((Box::new(sink), Box::new(stream)))
    }
}

/// Split an established WebSocket into event halves.
///
/// Used by the client transport and by servers that accepted a socket.
pub fn split_socket<S>(socket: WebSocketStream<S>) -> (WsSink<S>, WsEventStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sink, stream) = socket.split();
    (WsSink { sink }, WsEventStream { stream })
}

/// Outbound half of a WebSocket connection.
pub struct WsSink<S> {
    sink: SplitSink<WebSocketStream<S>, Message>,
}

#[async_trait]
impl<S> EventSink for WsSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn emit(&mut self, event: &str, payload: Value) -> Result<()> {
        let text = serde_json::to_string(&Frame::new(event, payload))?;
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| DashboardError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.sink
            .close()
            .await
            .map_err(|e| DashboardError::Transport(e.to_string()))
    }
}

/// Inbound half of a WebSocket connection.
pub struct WsEventStream<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

#[async_trait]
impl<S> EventStream for WsEventStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn next_event(&mut self) -> Option<Result<Frame>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some(serde_json::from_str::<Frame>(text.as_str()).map_err(Into::into));
                }
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Some(Err(DashboardError::Transport(e.to_string()))),
            }
        }
    }
}
