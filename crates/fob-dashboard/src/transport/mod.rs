//! Duplex channel to the display process.
//!
//! The connection manager needs four things from a transport: connect, emit a
//! named event with a JSON payload, receive named events, and close. Anything
//! that can do that implements [`Transport`]; [`WsTransport`] is the default.

mod ws;

pub use ws::{WsEventStream, WsSink, WsTransport, split_socket};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Address of the display process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// WebSocket URL for this endpoint.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One named event on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name (`message`, `mode`)
    pub event: String,
    /// JSON payload
    #[serde(default)]
    pub payload: Value,
}

impl Frame {
    /// Create a frame.
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// Both halves of an established connection.
pub type Connection = (Box<dyn EventSink>, Box<dyn EventStream>);

/// Opens connections to the display.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to `endpoint`, returning the outbound and inbound halves.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection>;
}

/// Outbound half of a connection.
#[async_trait]
pub trait EventSink: Send {
    /// Emit a named event with a payload.
    async fn emit(&mut self, event: &str, payload: Value) -> Result<()>;

    /// Close the connection after flushing pending frames.
    async fn close(&mut self) -> Result<()>;
}

/// Inbound half of a connection.
#[async_trait]
pub trait EventStream: Send {
    /// Next named event, or `None` once the remote side has closed.
    async fn next_event(&mut self) -> Option<Result<Frame>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_formatting() {
        let endpoint = Endpoint::new("127.0.0.1", 9838);
        assert_eq!(endpoint.to_string(), "127.0.0.1:9838");
        assert_eq!(endpoint.ws_url(), "ws://127.0.0.1:9838");
    }

    #[test]
    fn test_frame_wire_shape() {
        let frame = Frame::new("mode", json!({"minimal": true}));
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"event": "mode", "payload": {"minimal": true}})
        );
    }

    #[test]
    fn test_frame_without_payload() {
        let frame: Frame = serde_json::from_str(r#"{"event": "ping"}"#).unwrap();
        assert_eq!(frame.event, "ping");
        assert_eq!(frame.payload, Value::Null);
    }
}
