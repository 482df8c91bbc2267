//! Terminal rendering of the display state.
//!
//! Full mode drives a progress bar and prints the build report; minimal mode
//! prints status changes and problem counts only.

use super::state::{DisplayState, ProblemCounts};
use fob_dashboard::{BuildStatus, Message};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Renders batches as they are applied to a [`DisplayState`].
pub struct Renderer {
    minimal: bool,
    colors: bool,
    bar: Option<ProgressBar>,
}

impl Renderer {
    pub fn new(minimal: bool, colors: bool) -> Self {
        let bar = (!minimal).then(|| {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓▒░"),
            );
            bar
        });

        Self {
            minimal,
            colors,
            bar,
        }
    }

    /// Render one batch that was just applied to `state`.
    pub fn render(&self, state: &DisplayState, batch: &[Message], status_changed: bool) {
        for message in batch {
            match message {
                Message::NodeEnv(env) => self.print(&format!("NODE_ENV: {}", env)),
                Message::Stats(_) => {
                    if let Some(counts) = state.problems {
                        self.print(&format!("  {}", problem_summary(counts, self.colors)));
                    }
                }
                Message::Log(text) if !self.minimal => self.print(text),
                _ => {}
            }
        }

        if status_changed {
            if let Some(status) = state.status {
                self.print(&status_line(status, &state.operations, self.colors));
            }
        }

        if let Some(bar) = &self.bar {
            bar.set_position((state.progress * 100.0).round() as u64);
            bar.set_message(state.operations.clone());
        }
    }

    /// Remove the progress bar from the terminal.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn print(&self, text: &str) {
        match &self.bar {
            Some(bar) => bar.suspend(|| println!("{}", text)),
            None => println!("{}", text),
        }
    }
}

/// One-line status report, e.g. `● Success      idle (3s)`.
pub fn status_line(status: BuildStatus, operations: &str, colors: bool) -> String {
    let label = format!("{:<11}", status.to_string());
    let label = if colors {
        match status {
            BuildStatus::Compiling => label.cyan().bold().to_string(),
            BuildStatus::Invalidated => label.yellow().bold().to_string(),
            BuildStatus::Failed => label.red().bold().to_string(),
            BuildStatus::Success => label.green().bold().to_string(),
        }
    } else {
        label
    };

    format!("● {} {}", label, operations).trim_end().to_string()
}

/// Human summary of problem counts, e.g. `1 error, 2 warnings`.
pub fn problem_summary(counts: ProblemCounts, colors: bool) -> String {
    if counts.is_clean() {
        return if colors {
            "no problems".green().to_string()
        } else {
            "no problems".to_string()
        };
    }

    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };

    let errors = plural(counts.errors, "error");
    let warnings = plural(counts.warnings, "warning");
    if colors {
        format!("{}, {}", errors.red(), warnings.yellow())
    } else {
        format!("{}, {}", errors, warnings)
    }
}
