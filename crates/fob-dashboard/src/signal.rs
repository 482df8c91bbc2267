//! Lifecycle signals raised by the host bundler.

use crate::stats::BuildStats;

/// A phase boundary in the bundler's compilation run.
///
/// Signals arrive strictly in order; the bridge never reorders them.
pub enum LifecycleSignal {
    /// A watch-mode run is starting
    WatchRun,
    /// A single build is starting
    Run,
    /// A compilation started
    Compile,
    /// Progress report from the bundler
    Progress {
        /// Completion ratio, clamped to `[0, 1]` by the bridge
        percent: f64,
        /// Description of the current phase
        message: String,
    },
    /// Sources changed, the last result is stale
    Invalid,
    /// The build failed without producing stats
    Failed,
    /// The compilation finished
    Done(Box<dyn BuildStats>),
}

impl LifecycleSignal {
    /// Shorthand for a progress signal.
    pub fn progress(percent: f64, message: impl Into<String>) -> Self {
        LifecycleSignal::Progress {
            percent,
            message: message.into(),
        }
    }

    /// Shorthand for a done signal.
    pub fn done(stats: impl BuildStats + 'static) -> Self {
        LifecycleSignal::Done(Box::new(stats))
    }

    /// Lower-case name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleSignal::WatchRun => "watch-run",
            LifecycleSignal::Run => "run",
            LifecycleSignal::Compile => "compile",
            LifecycleSignal::Progress { .. } => "progress",
            LifecycleSignal::Invalid => "invalid",
            LifecycleSignal::Failed => "failed",
            LifecycleSignal::Done(_) => "done",
        }
    }
}

impl std::fmt::Debug for LifecycleSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleSignal::WatchRun => f.write_str("WatchRun"),
            LifecycleSignal::Run => f.write_str("Run"),
            LifecycleSignal::Compile => f.write_str("Compile"),
            LifecycleSignal::Progress { percent, message } => f
                .debug_struct("Progress")
                .field("percent", percent)
                .field("message", message)
                .finish(),
            LifecycleSignal::Invalid => f.write_str("Invalid"),
            LifecycleSignal::Failed => f.write_str("Failed"),
            LifecycleSignal::Done(stats) => f
                .debug_struct("Done")
                .field("errors", &stats.has_errors())
                .field("warnings", &stats.has_warnings())
                .finish(),
        }
    }
}
