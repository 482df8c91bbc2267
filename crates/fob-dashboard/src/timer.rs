//! Build duration timer.

use std::time::{Duration, Instant};

/// Tracks wall-clock time for the current build.
///
/// There is one timer per build cycle. `start` is called on every compile
/// transition and simply overwrites the previous instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildTimer {
    started_at: Option<Instant>,
}

impl BuildTimer {
    /// Create a timer that has not been started yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current instant as the build's start.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Time elapsed since the last `start`, or zero if never started.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    /// Short human label for the elapsed time ("412ms", "3s").
    pub fn elapsed_label(&self) -> String {
        label_for(self.elapsed())
    }
}

/// Format a duration the way the dashboard displays it.
///
/// Below one second the exact millisecond count is shown; from one second on
/// the value is rounded to whole seconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fob_dashboard::timer::label_for;
///
/// assert_eq!(label_for(Duration::from_millis(412)), "412ms");
/// assert_eq!(label_for(Duration::from_millis(3400)), "3s");
/// ```
pub fn label_for(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else {
        format!("{}s", (total_ms as f64 / 1000.0).round() as u64)
    }
}
