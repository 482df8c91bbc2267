//! Delivery switch between a caller-supplied handler and the socket.

use crate::connection::ConnectionManager;
use crate::message::Message;
use std::sync::Arc;

/// Callback that receives every batch in place of the transport.
pub type MessageHandler = Arc<dyn Fn(&[Message]) + Send + Sync>;

/// Where batches go.
///
/// With a handler the bridge never opens a connection and calls the handler
/// synchronously. Otherwise batches go through the [`ConnectionManager`] and
/// are dropped until it is connected.
#[derive(Clone)]
pub enum Emitter {
    /// Caller-supplied handler
    Handler(MessageHandler),
    /// Socket-backed delivery
    Connection(ConnectionManager),
}

impl Emitter {
    /// Deliver one batch.
    ///
    /// Returns `false` if the batch was dropped.
    pub fn emit(&self, batch: &[Message]) -> bool {
        match self {
            Emitter::Handler(handler) => {
                handler(batch);
                true
            }
            Emitter::Connection(connection) => connection.emit(batch),
        }
    }

    /// The connection manager, in socket mode.
    pub fn connection(&self) -> Option<&ConnectionManager> {
        match self {
            Emitter::Handler(_) => None,
            Emitter::Connection(connection) => Some(connection),
        }
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Emitter::Handler(_) => f.write_str("Emitter::Handler"),
            Emitter::Connection(connection) => {
                f.debug_tuple("Emitter::Connection").field(connection).finish()
            }
        }
    }
}
