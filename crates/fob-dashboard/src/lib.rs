#![cfg_attr(docsrs, feature(doc_cfg))]

//! # fob-dashboard
//!
//! Republishes a bundler's compilation lifecycle to a remote display.
//!
//! The host raises [`LifecycleSignal`]s at phase boundaries. The
//! [`LifecycleBridge`] turns each one into a batch of typed [`Message`]s and
//! delivers it either to a caller-supplied handler or over a lazily opened
//! duplex connection to the display process.
//!
//! ## Quick Start
//!
//! ### Handler mode
//!
//! ```
//! use fob_dashboard::{DashboardOptions, DashboardPlugin, HostContext, LifecycleSignal, Message};
//!
//! let options = DashboardOptions::default().with_handler(|batch: &[Message]| {
//!     for message in batch {
//!         println!("{}", message.kind());
//!     }
//! });
//!
//! let mut bridge = DashboardPlugin::new(options).bridge(HostContext::new());
//! bridge.handle(LifecycleSignal::Compile);
//! bridge.handle(LifecycleSignal::progress(0.5, "building"));
//! ```
//!
//! ### Socket mode
//!
//! ```no_run
//! use fob_dashboard::{DashboardOptions, DashboardPlugin, HostContext, LifecycleSignal};
//!
//! # #[tokio::main]
//! # async fn main() -> fob_dashboard::Result<()> {
//! let plugin = DashboardPlugin::new(DashboardOptions::load(None)?);
//! let handle = plugin.spawn(HostContext::new());
//!
//! handle.signal(LifecycleSignal::WatchRun);
//! handle.signal(LifecycleSignal::Compile);
//! handle.shutdown().await;
//! # Ok(()) }
//! ```

pub mod bridge;
pub mod config;
pub mod connection;
pub mod emitter;
pub mod env;
pub mod error;
pub mod message;
pub mod plugin;
pub mod root;
pub mod signal;
pub mod stats;
pub mod timer;
pub mod transport;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use bridge::{BridgeCommand, HostContext, LifecycleBridge};
pub use config::DashboardConfig;
pub use connection::{ConnectionManager, ConnectionState};
pub use emitter::{Emitter, MessageHandler};
pub use env::{BuildEnvironment, DefineConstants, StaticEnvironment};
pub use error::{ConfigError, DashboardError, Result, serialize_error};
pub use message::{Batch, BuildStatus, Message, ModeOptions, StatsPayload};
pub use plugin::{DashboardHandle, DashboardOptions, DashboardPlugin};
pub use root::resolve_project_root;
pub use signal::LifecycleSignal;
pub use stats::{AssetStat, BuildStats, StatsOptions, StatsSummary};
pub use timer::BuildTimer;
pub use transport::{Endpoint, EventSink, EventStream, Frame, Transport, WsTransport};
