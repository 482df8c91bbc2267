//! Lifecycle bridge: the state machine between bundler signals and batches.
//!
//! | Signal   | Side effect             | Batch                                 |
//! |----------|-------------------------|---------------------------------------|
//! | WatchRun | watching = true         | none                                  |
//! | Run      | watching = false        | none                                  |
//! | Compile  | timer restarts          | status                                |
//! | Progress |                         | status, progress, operations          |
//! | Invalid  |                         | status, progress, operations, clear   |
//! | Failed   |                         | status, operations                    |
//! | Done     | cleanup unless watching | status, progress, operations, stats, log |

use crate::connection::ConnectionManager;
use crate::emitter::Emitter;
use crate::env::{BuildEnvironment, StaticEnvironment, resolve_node_env};
use crate::error::serialize_error;
use crate::message::{Batch, BuildStatus, Message, StatsPayload};
use crate::root::resolve_project_root;
use crate::signal::LifecycleSignal;
use crate::stats::{BuildStats, StatsOptions, resolve_stats_options};
use crate::timer::BuildTimer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Operations text shown while no build is running.
pub const IDLE: &str = "idle";

/// Work item for [`LifecycleBridge::run`].
#[derive(Debug)]
pub enum BridgeCommand {
    /// Handle a lifecycle signal
    Signal(LifecycleSignal),
    /// Run [`LifecycleBridge::cleanup`] once every earlier signal is handled
    Cleanup(oneshot::Sender<bool>),
}

impl From<LifecycleSignal> for BridgeCommand {
    fn from(signal: LifecycleSignal) -> Self {
        BridgeCommand::Signal(signal)
    }
}

/// What the bridge knows about the host bundler.
#[derive(Clone)]
pub struct HostContext {
    /// Bundle context directory, probed for a manifest
    pub context: Option<PathBuf>,
    /// Global stats display options
    pub stats: Option<StatsOptions>,
    /// Dev-server stats display options, preferred over the global ones
    pub dev_server_stats: Option<StatsOptions>,
    /// NODE_ENV provider
    pub environment: Arc<dyn BuildEnvironment>,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            context: None,
            stats: None,
            dev_server_stats: None,
            environment: Arc::new(StaticEnvironment(None)),
        }
    }
}

impl HostContext {
    /// Empty host context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bundle context directory.
    pub fn with_context(mut self, context: impl Into<PathBuf>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the global stats options.
    pub fn with_stats(mut self, options: StatsOptions) -> Self {
        self.stats = Some(options);
        self
    }

    /// Set the dev-server stats options.
    pub fn with_dev_server_stats(mut self, options: StatsOptions) -> Self {
        self.dev_server_stats = Some(options);
        self
    }

    /// Set the NODE_ENV provider.
    pub fn with_environment(mut self, environment: impl BuildEnvironment + 'static) -> Self {
        self.environment = Arc::new(environment);
        self
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext")
            .field("context", &self.context)
            .field("stats", &self.stats)
            .field("dev_server_stats", &self.dev_server_stats)
            .field("node_env", &self.environment.node_env())
            .finish()
    }
}

/// Translates lifecycle signals into message batches.
#[derive(Debug)]
pub struct LifecycleBridge {
    emitter: Emitter,
    timer: BuildTimer,
    watching: bool,
    host: HostContext,
    explicit_root: Option<PathBuf>,
}

impl LifecycleBridge {
    /// Create a bridge delivering through `emitter`.
    ///
    /// In socket mode the connection is opened here, with NODE_ENV resolved
    /// once from the host.
    pub fn new(emitter: Emitter, host: HostContext, explicit_root: Option<PathBuf>) -> Self {
        if let Some(connection) = emitter.connection() {
            connection.open(resolve_node_env(host.environment.as_ref()));
        }

        Self {
            emitter,
            timer: BuildTimer::new(),
            watching: false,
            host,
            explicit_root,
        }
    }

    /// Apply one signal and emit its batch.
    pub fn handle(&mut self, signal: LifecycleSignal) {
        tracing::trace!(signal = signal.name(), "Dashboard signal");

        match signal {
            LifecycleSignal::WatchRun => self.watching = true,
            LifecycleSignal::Run => self.watching = false,
            LifecycleSignal::Compile => {
                self.timer.start();
                self.emit(vec![Message::Status(BuildStatus::Compiling)]);
            }
            LifecycleSignal::Progress { percent, message } => {
                self.emit(vec![
                    Message::Status(BuildStatus::Compiling),
                    Message::Progress(clamp_percent(percent)),
                    Message::Operations(self.with_elapsed(&message)),
                ]);
            }
            LifecycleSignal::Invalid => {
                self.emit(vec![
                    Message::Status(BuildStatus::Invalidated),
                    Message::Progress(0.0),
                    Message::Operations(IDLE.to_string()),
                    Message::Clear,
                ]);
            }
            LifecycleSignal::Failed => {
                self.emit(vec![
                    Message::Status(BuildStatus::Failed),
                    Message::Operations(self.with_elapsed(IDLE)),
                ]);
            }
            LifecycleSignal::Done(stats) => {
                let batch = self.done_batch(stats.as_ref());
                self.emit(batch);
                if !self.is_watching() {
                    self.cleanup();
                }
            }
        }
    }

    /// Process commands until the channel closes, then release the connection.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<BridgeCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                BridgeCommand::Signal(signal) => self.handle(signal),
                BridgeCommand::Cleanup(reply) => {
                    let _ = reply.send(self.cleanup());
                }
            }
        }
        self.cleanup();
    }

    /// Whether the current run is a watch run.
    pub fn is_watching(&self) -> bool {
        self.watching
    }

    /// Close the connection unless a build is in flight.
    pub fn cleanup(&self) -> bool {
        self.emitter
            .connection()
            .is_some_and(|connection| connection.close_if_idle(self.is_watching()))
    }

    /// The connection manager, in socket mode.
    pub fn connection(&self) -> Option<&ConnectionManager> {
        self.emitter.connection()
    }

    /// Best-effort project root, recomputed on every call.
    pub fn project_root(&self) -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok();
        resolve_project_root(
            self.explicit_root.as_deref(),
            self.host.context.as_deref(),
            cwd.as_deref(),
        )
    }

    /// Whether the versions report can run.
    pub fn versions_enabled(&self) -> bool {
        self.project_root().is_some()
    }

    fn done_batch(&self, stats: &dyn BuildStats) -> Batch {
        let data = match stats.to_json() {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(error = %err, "Stats could not be serialized");
                serialize_error(&err)
            }
        };
        let options =
            resolve_stats_options(self.host.dev_server_stats.as_ref(), self.host.stats.as_ref());

        vec![
            Message::Status(BuildStatus::Success),
            Message::Progress(0.0),
            Message::Operations(self.with_elapsed(IDLE)),
            Message::Stats(StatsPayload {
                errors: stats.has_errors(),
                warnings: stats.has_warnings(),
                data,
            }),
            Message::Log(stats.render(&options)),
        ]
    }

    fn with_elapsed(&self, message: &str) -> String {
        format!("{} ({})", message, self.timer.elapsed_label())
    }

    fn emit(&self, batch: Batch) {
        self.emitter.emit(&batch);
    }
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(-0.5), 0.0);
        assert_eq!(clamp_percent(0.42), 0.42);
        assert_eq!(clamp_percent(7.0), 1.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
    }

    #[test]
    fn test_host_context_builders() {
        let host = HostContext::new()
            .with_context("/project")
            .with_dev_server_stats(StatsOptions {
                colors: false,
                assets: false,
            });

        assert_eq!(host.context.as_deref(), Some(std::path::Path::new("/project")));
        assert!(host.stats.is_none());
        assert_eq!(host.environment.node_env(), None);
    }
}
