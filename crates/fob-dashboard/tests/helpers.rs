//! Shared test utilities for fob-dashboard tests
//!
//! [`MemoryTransport`] stands in for the display: it records every outbound
//! frame and lets the test push inbound events or hang up.

#![allow(dead_code)]

use async_trait::async_trait;
use fob_dashboard::error::{DashboardError, Result};
use fob_dashboard::message::{MESSAGE_EVENT, MODE_EVENT, encode_batch};
use fob_dashboard::transport::{Connection, Endpoint, EventSink, EventStream, Frame, Transport};
use fob_dashboard::{Message, MessageHandler};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};

/// Remote side of a [`MemoryTransport`].
#[derive(Clone, Default)]
pub struct MemoryDisplay {
    frames: Arc<Mutex<Vec<Frame>>>,
    closed: Arc<AtomicBool>,
    connects: Arc<AtomicUsize>,
    inbound: Arc<Mutex<Option<mpsc::UnboundedSender<Frame>>>>,
}

impl MemoryDisplay {
    /// Every frame received so far.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    /// Payloads of the `message` frames, one entry per batch.
    pub fn batches(&self) -> Vec<Value> {
        self.frames()
            .into_iter()
            .filter(|frame| frame.event == MESSAGE_EVENT)
            .map(|frame| frame.payload)
            .collect()
    }

    /// Whether the client closed the connection.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of connect attempts.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Announce the display mode.
    pub fn send_mode(&self, minimal: bool) {
        self.send(Frame::new(MODE_EVENT, json!({ "minimal": minimal })));
    }

    /// Push an arbitrary inbound frame.
    pub fn send(&self, frame: Frame) {
        if let Some(tx) = self.inbound.lock().as_ref() {
            let _ = tx.send(frame);
        }
    }

    /// Close the connection from the display side.
    pub fn hang_up(&self) {
        self.inbound.lock().take();
    }
}

/// In-memory [`Transport`].
#[derive(Clone, Default)]
pub struct MemoryTransport {
    display: MemoryDisplay,
    gate: Option<Arc<Notify>>,
    refuse: bool,
}

impl MemoryTransport {
    /// Transport that connects immediately.
    pub fn new() -> (Self, MemoryDisplay) {
        let transport = Self::default();
        let display = transport.display.clone();
        (transport, display)
    }

    /// Transport whose connect blocks until the returned gate is notified.
    pub fn gated() -> (Self, MemoryDisplay, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let transport = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        let display = transport.display.clone();
        (transport, display, gate)
    }

    /// Transport that always fails to connect.
    pub fn refusing() -> (Self, MemoryDisplay) {
        let transport = Self {
            refuse: true,
            ..Self::default()
        };
        let display = transport.display.clone();
        (transport, display)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection> {
        self.display.connects.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.refuse {
            return Err(DashboardError::Connect {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.display.inbound.lock() = Some(tx);

        let sink = MemorySink {
            display: self.display.clone(),
        };
        Ok((Box::new(sink), Box::new(MemoryStream { rx })))
    }
}

struct MemorySink {
    display: MemoryDisplay,
}

#[async_trait]
impl EventSink for MemorySink {
    async fn emit(&mut self, event: &str, payload: Value) -> Result<()> {
        if self.display.is_closed() {
            return Err(DashboardError::Transport("connection closed".to_string()));
        }
        self.display.frames.lock().push(Frame::new(event, payload));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.display.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MemoryStream {
    rx: mpsc::UnboundedReceiver<Frame>,
}

#[async_trait]
impl EventStream for MemoryStream {
    async fn next_event(&mut self) -> Option<Result<Frame>> {
        self.rx.recv().await.map(Ok)
    }
}

/// Handler that records each batch as wire JSON.
pub fn recording_handler() -> (MessageHandler, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler: MessageHandler = Arc::new(move |batch: &[Message]| {
        sink.lock().push(encode_batch(batch).expect("batch encodes"));
    });
    (handler, seen)
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within 2s");
}
