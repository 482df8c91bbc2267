//! Connection lifecycle to the display process.
//!
//! ```text
//! Unconnected --open()--> Connecting --connect ok--> Connected
//!                              |                          |
//!                              +----- close_if_idle() ----+--> Closed
//! ```
//!
//! Batches emitted before the connection is live are dropped, not queued.
//! Once connected, a `nodeEnv` batch goes out first, then batches in emit
//! order. At most [`OUTBOX_CAPACITY`] batches wait for a slow display; the
//! overflow is dropped like pre-connect emits. Teardown is guarded: it only happens when no build is in flight and
//! a transport exists, and repeated calls are no-ops.

use crate::message::{MESSAGE_EVENT, MODE_EVENT, Message, ModeOptions, encode_batch};
use crate::transport::{Endpoint, EventSink, Transport};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Batches that may queue behind a slow display.
pub const OUTBOX_CAPACITY: usize = 256;

/// Lifecycle state of the display connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// `open` has not been called
    Unconnected,
    /// Connect attempt in flight; emits are dropped
    Connecting,
    /// Emits are forwarded to the transport
    Connected,
    /// Torn down, unreachable, or closed by the remote side
    Closed,
}

impl ConnectionState {
    /// Whether the connect attempt has finished one way or the other.
    pub fn is_settled(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Closed)
    }
}

/// Work item for the connection task.
enum Outbound {
    Batch(Value),
    Close,
}

struct Inner {
    /// Present from `open` until teardown; `None` makes emits no-ops
    outbox: Option<mpsc::Sender<Outbound>>,
    minimal: bool,
}

/// Owns the duplex channel to the display.
///
/// Cloning is cheap and every clone observes the same connection.
#[derive(Clone)]
pub struct ConnectionManager {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    inner: Arc<Mutex<Inner>>,
    state: Arc<watch::Sender<ConnectionState>>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .field("minimal", &self.minimal())
            .finish()
    }
}

impl ConnectionManager {
    /// Create an unconnected manager for `endpoint`.
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Unconnected);
        Self {
            endpoint,
            transport,
            inner: Arc::new(Mutex::new(Inner {
                outbox: None,
                minimal: false,
            })),
            state: Arc::new(state),
        }
    }

    /// The address this manager dials.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Display mode announced by the remote side (`false` until received).
    pub fn minimal(&self) -> bool {
        self.inner.lock().minimal
    }

    /// Start connecting in the background.
    ///
    /// `node_env` is announced once the connection is live. Calling `open`
    /// more than once has no effect. Outside a tokio runtime the manager goes
    /// straight to `Closed` and stays inert.
    pub fn open(&self, node_env: String) {
        let mut inner = self.inner.lock();
        if self.state() != ConnectionState::Unconnected {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No async runtime available, dashboard updates disabled");
            self.state.send_replace(ConnectionState::Closed);
            return;
        };

        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        inner.outbox = Some(tx);
        self.state.send_replace(ConnectionState::Connecting);
        drop(inner);

        runtime.spawn(run_connection(self.clone(), rx, node_env));
    }

    /// Emit a batch if the connection is live.
    ///
    /// Returns `false` when the batch was dropped, including when the display
    /// is too slow to drain the outbox.
    pub fn emit(&self, batch: &[Message]) -> bool {
        let inner = self.inner.lock();
        if self.state() != ConnectionState::Connected {
            tracing::trace!(state = ?self.state(), "Dropping dashboard batch");
            return false;
        }

        let Some(outbox) = &inner.outbox else {
            return false;
        };

        match encode_batch(batch) {
            Ok(payload) => match outbox.try_send(Outbound::Batch(payload)) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!("Dashboard outbox full, dropping batch");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            },
            Err(err) => {
                tracing::debug!(error = %err, "Failed to encode dashboard batch");
                false
            }
        }
    }

    /// Tear the connection down unless a build is in flight.
    ///
    /// Returns `true` only for the call that actually closed the connection.
    /// Already-queued batches are flushed before the transport closes.
    pub fn close_if_idle(&self, watching: bool) -> bool {
        if watching {
            return false;
        }

        let mut inner = self.inner.lock();
        let Some(outbox) = inner.outbox.take() else {
            return false;
        };

        // A full outbox still closes: dropping the sender ends the task's queue
        let _ = outbox.try_send(Outbound::Close);
        self.state.send_replace(ConnectionState::Closed);
        tracing::debug!(endpoint = %self.endpoint, "Dashboard connection closed");
        true
    }

    /// Wait until the connect attempt has finished.
    ///
    /// Never resolves for a manager that was not opened.
    pub async fn wait_for_settled(&self) -> ConnectionState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(ConnectionState::is_settled).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }

    fn mark_closed(&self) {
        let mut inner = self.inner.lock();
        inner.outbox = None;
        self.state.send_replace(ConnectionState::Closed);
    }
}

async fn run_connection(
    manager: ConnectionManager,
    mut outbox: mpsc::Receiver<Outbound>,
    node_env: String,
) {
    let endpoint = manager.endpoint.clone();

    let (mut sink, mut stream) = match manager.transport.connect(&endpoint).await {
        Ok(connection) => connection,
        Err(err) => {
            tracing::debug!(endpoint = %endpoint, error = %err, "Dashboard unreachable, updates disabled");
            manager.mark_closed();
            return;
        }
    };

    let torn_down = {
        let inner = manager.inner.lock();
        if inner.outbox.is_some() {
            manager.state.send_replace(ConnectionState::Connected);
        }
        inner.outbox.is_none()
    };
    if torn_down {
        // Closed while connecting
        let _ = sink.close().await;
        return;
    }
    tracing::debug!(endpoint = %endpoint, "Connected to dashboard");

    let greeting = [Message::NodeEnv(node_env)];
    if let Err(err) = send_batch(sink.as_mut(), &greeting).await {
        tracing::debug!(error = %err, "Failed to announce NODE_ENV");
        manager.mark_closed();
        return;
    }

    let mut mode_received = false;
    loop {
        tokio::select! {
            outbound = outbox.recv() => match outbound {
                Some(Outbound::Batch(payload)) => {
                    if let Err(err) = sink.emit(MESSAGE_EVENT, payload).await {
                        tracing::debug!(error = %err, "Failed to send dashboard batch");
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.close().await;
                    break;
                }
            },
            incoming = stream.next_event() => match incoming {
                Some(Ok(frame)) if frame.event == MODE_EVENT && !mode_received => {
                    match serde_json::from_value::<ModeOptions>(frame.payload) {
                        Ok(mode) => {
                            manager.inner.lock().minimal = mode.minimal;
                            mode_received = true;
                            tracing::debug!(minimal = mode.minimal, "Dashboard mode received");
                        }
                        Err(err) => tracing::debug!(error = %err, "Ignoring malformed mode event"),
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "Dashboard connection failed");
                    break;
                }
                None => {
                    tracing::debug!("Dashboard closed the connection");
                    break;
                }
            },
        }
    }

    manager.mark_closed();
}

async fn send_batch(sink: &mut dyn EventSink, batch: &[Message]) -> crate::error::Result<()> {
    sink.emit(MESSAGE_EVENT, encode_batch(batch)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DashboardError, Result};
    use crate::transport::{Connection, EventStream, Frame};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn connect(&self, endpoint: &Endpoint) -> Result<Connection> {
            Err(DashboardError::Connect {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    struct Stalled;

    #[async_trait]
    impl Transport for Stalled {
        async fn connect(&self, _endpoint: &Endpoint) -> Result<Connection> {
            Ok((Box::new(StalledSink), Box::new(SilentStream)))
        }
    }

    /// Sink that never finishes a send.
    struct StalledSink;

    #[async_trait]
    impl EventSink for StalledSink {
        async fn emit(&mut self, _event: &str, _payload: Value) -> Result<()> {
            std::future::pending().await
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct SilentStream;

    #[async_trait]
    impl EventStream for SilentStream {
        async fn next_event(&mut self) -> Option<Result<Frame>> {
            std::future::pending().await
        }
    }

    fn manager() -> ConnectionManager {
        ConnectionManager::new(Endpoint::new("127.0.0.1", 9838), Arc::new(Unreachable))
    }

    #[test]
    fn test_new_manager_is_unconnected() {
        let manager = manager();
        assert_eq!(manager.state(), ConnectionState::Unconnected);
        assert!(!manager.minimal());
        assert!(!manager.emit(&[Message::Clear]));
    }

    #[test]
    fn test_close_without_transport_is_noop() {
        let manager = manager();
        assert!(!manager.close_if_idle(false));
        assert_eq!(manager.state(), ConnectionState::Unconnected);
    }

    #[test]
    fn test_open_outside_runtime_stays_inert() {
        let manager = manager();
        manager.open("development".to_string());
        assert_eq!(manager.state(), ConnectionState::Closed);
        assert!(!manager.emit(&[Message::Clear]));
    }

    #[tokio::test]
    async fn test_unreachable_display_settles_closed() {
        let manager = manager();
        manager.open("development".to_string());

        assert_eq!(manager.wait_for_settled().await, ConnectionState::Closed);
        assert!(!manager.emit(&[Message::Clear]));
        assert!(!manager.close_if_idle(false));
    }

    #[test]
    fn test_state_is_settled() {
        assert!(!ConnectionState::Unconnected.is_settled());
        assert!(!ConnectionState::Connecting.is_settled());
        assert!(ConnectionState::Connected.is_settled());
        assert!(ConnectionState::Closed.is_settled());
    }

    #[tokio::test]
    async fn test_stalled_display_drops_overflow() {
        let manager = ConnectionManager::new(Endpoint::new("127.0.0.1", 9838), Arc::new(Stalled));
        manager.open("development".to_string());
        assert_eq!(manager.wait_for_settled().await, ConnectionState::Connected);

        for _ in 0..OUTBOX_CAPACITY {
            assert!(manager.emit(&[Message::Clear]));
        }
        assert!(!manager.emit(&[Message::Clear]));
        assert_eq!(manager.state(), ConnectionState::Connected);

        assert!(manager.close_if_idle(false));
        assert_eq!(manager.state(), ConnectionState::Closed);
    }
}
