//! Entry point for host integrations.
//!
//! ```rust,no_run
//! use fob_dashboard::{DashboardOptions, DashboardPlugin, HostContext, LifecycleSignal};
//!
//! # async fn run() -> fob_dashboard::Result<()> {
//! let plugin = DashboardPlugin::new(DashboardOptions::load(None)?);
//! let handle = plugin.spawn(HostContext::new().with_context("."));
//!
//! handle.signal(LifecycleSignal::Run);
//! handle.signal(LifecycleSignal::Compile);
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

use crate::bridge::{BridgeCommand, HostContext, LifecycleBridge};
use crate::config::DashboardConfig;
use crate::connection::ConnectionManager;
use crate::emitter::{Emitter, MessageHandler};
use crate::error::Result;
use crate::message::Message;
use crate::signal::LifecycleSignal;
use crate::transport::{Transport, WsTransport};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Plugin options: where the display is and how batches are delivered.
#[derive(Clone)]
pub struct DashboardOptions {
    /// Display address and project root
    pub config: DashboardConfig,
    /// Receives batches instead of the transport when set
    pub handler: Option<MessageHandler>,
    /// Transport used when no handler is set
    pub transport: Arc<dyn Transport>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl std::fmt::Debug for DashboardOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardOptions")
            .field("config", &self.config)
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl DashboardOptions {
    /// Options for `config` with the WebSocket transport.
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            handler: None,
            transport: Arc::new(WsTransport),
        }
    }

    /// Options from [`DashboardConfig::load`].
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        DashboardConfig::load(config_path).map(Self::new)
    }

    /// Deliver batches to `handler` and never open a connection.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[Message]) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Use a custom transport.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }
}

/// The dashboard plugin.
#[derive(Debug, Clone, Default)]
pub struct DashboardPlugin {
    options: DashboardOptions,
}

impl DashboardPlugin {
    /// Create a plugin.
    pub fn new(options: DashboardOptions) -> Self {
        Self { options }
    }

    /// Plugin options.
    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    /// Build a bridge for one host.
    ///
    /// In socket mode this opens the connection in the background, so it must
    /// run inside a tokio runtime to reach the display.
    pub fn bridge(&self, host: HostContext) -> LifecycleBridge {
        let emitter = match &self.options.handler {
            Some(handler) => Emitter::Handler(Arc::clone(handler)),
            None => Emitter::Connection(ConnectionManager::new(
                self.options.config.endpoint(),
                Arc::clone(&self.options.transport),
            )),
        };

        LifecycleBridge::new(emitter, host, self.options.config.root.clone())
    }

    /// Run a bridge on its own task and return a handle for sending signals.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(&self, host: HostContext) -> DashboardHandle {
        let bridge = self.bridge(host);
        let connection = bridge.connection().cloned();

        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(bridge.run(rx));

        DashboardHandle {
            commands,
            connection,
            task,
        }
    }
}

/// Handle to a spawned bridge.
#[derive(Debug)]
pub struct DashboardHandle {
    commands: mpsc::UnboundedSender<BridgeCommand>,
    connection: Option<ConnectionManager>,
    task: JoinHandle<()>,
}

impl DashboardHandle {
    /// Queue a signal for the bridge. Returns `false` once the bridge stopped.
    pub fn signal(&self, signal: LifecycleSignal) -> bool {
        self.commands.send(BridgeCommand::Signal(signal)).is_ok()
    }

    /// Close the connection unless a build is in flight.
    ///
    /// Runs after every signal queued before it, so a teardown hook firing
    /// right after `WatchRun` sees the watch run. Safe to call any number of
    /// times; returns `true` only for the call that closed the connection.
    pub async fn cleanup(&self) -> bool {
        let (reply, closed) = oneshot::channel();
        if self.commands.send(BridgeCommand::Cleanup(reply)).is_err() {
            // The bridge released the connection when it stopped
            return false;
        }
        closed.await.unwrap_or(false)
    }

    /// Display mode announced by the display.
    pub fn minimal(&self) -> bool {
        self.connection.as_ref().is_some_and(ConnectionManager::minimal)
    }

    /// The connection manager, in socket mode.
    pub fn connection(&self) -> Option<&ConnectionManager> {
        self.connection.as_ref()
    }

    /// Stop accepting signals and wait for the bridge to drain them.
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(err) = self.task.await {
            tracing::debug!(error = %err, "Dashboard bridge task ended abnormally");
        }
    }
}
