//! Display state aggregated from incoming batches.

use fob_dashboard::{BuildStatus, Message, StatsPayload};
use serde_json::Value;

/// Number of errors and warnings reported by the last build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemCounts {
    pub errors: usize,
    pub warnings: usize,
}

impl ProblemCounts {
    /// Count problems from a stats payload.
    ///
    /// Arrays under `data.errors` / `data.warnings` are counted; otherwise the
    /// boolean flags count as one each.
    pub fn from_stats(stats: &StatsPayload) -> Self {
        let count = |key: &str, flag: bool| match stats.data.get(key) {
            Some(Value::Array(items)) => items.len(),
            _ => usize::from(flag),
        };

        Self {
            errors: count("errors", stats.errors),
            warnings: count("warnings", stats.warnings),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

/// Latest value of every message type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub node_env: Option<String>,
    pub status: Option<BuildStatus>,
    pub progress: f64,
    pub operations: String,
    pub problems: Option<ProblemCounts>,
    pub stats: Option<Value>,
    pub log: Option<String>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch in order. Returns `true` if the status changed.
    pub fn apply(&mut self, batch: &[Message]) -> bool {
        let previous = self.status;

        for message in batch {
            match message {
                Message::NodeEnv(env) => self.node_env = Some(env.clone()),
                Message::Status(status) => self.status = Some(*status),
                Message::Progress(value) => self.progress = value.clamp(0.0, 1.0),
                Message::Operations(text) => self.operations = text.clone(),
                Message::Clear => self.clear(),
                Message::Stats(stats) => {
                    self.problems = Some(ProblemCounts::from_stats(stats));
                    self.stats = Some(stats.data.clone());
                }
                Message::Log(text) => self.log = Some(text.clone()),
            }
        }

        self.status != previous
    }

    /// Reset the transient panels.
    fn clear(&mut self) {
        self.problems = None;
        self.stats = None;
        self.log = None;
    }
}
