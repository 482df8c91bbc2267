//! WebSocket listener the dashboard plugin connects to.
//!
//! Each accepted connection is told the display mode once, then every
//! `message` frame is decoded into a batch and forwarded to the render loop.

use crate::error::{CliError, Result};
use fob_dashboard::message::{MESSAGE_EVENT, MODE_EVENT, decode_batch};
use fob_dashboard::transport::{EventSink, EventStream, split_socket};
use fob_dashboard::{Batch, ModeOptions};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Accepts plugin connections.
pub struct DisplayServer {
    listener: TcpListener,
    mode: ModeOptions,
}

impl DisplayServer {
    /// Bind to `host:port`. Port 0 picks a free port.
    pub async fn bind(host: &str, port: u16, minimal: bool) -> Result<Self> {
        let address = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| CliError::Bind { address, source })?;

        Ok(Self {
            listener,
            mode: ModeOptions { minimal },
        })
    }

    /// Address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the batch receiver goes away.
    pub async fn run(self, batches: mpsc::UnboundedSender<Batch>) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(%peer, "Plugin connected");
                        tokio::spawn(handle_connection(stream, self.mode, batches.clone()));
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to accept connection"),
                },
                _ = batches.closed() => break,
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    mode: ModeOptions,
    batches: mpsc::UnboundedSender<Batch>,
) {
    let socket = match tokio_tungstenite::accept_async(stream).await {
        Ok(socket) => socket,
        Err(e) => {
            tracing::debug!(error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (mut sink, mut events) = split_socket(socket);

    let payload = match serde_json::to_value(mode) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to encode display mode");
            return;
        }
    };
    if let Err(e) = sink.emit(MODE_EVENT, payload).await {
        tracing::debug!(error = %e, "Failed to announce display mode");
        return;
    }

    while let Some(event) = events.next_event().await {
        let frame = match event {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "Plugin connection failed");
                break;
            }
        };

        if frame.event != MESSAGE_EVENT {
            continue;
        }

        match decode_batch(frame.payload) {
            Ok(batch) => {
                if batches.send(batch).is_err() {
                    break;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring malformed batch"),
        }
    }

    let _ = sink.close().await;
    tracing::debug!("Plugin disconnected");
}
