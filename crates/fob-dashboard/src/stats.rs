//! Build statistics supplied by the host bundler.
//!
//! The bridge reads stats only at the `done` transition. [`BuildStats`] is the
//! seam the host implements; [`StatsSummary`] is a ready-made implementation
//! for hosts that already have the numbers at hand.

use crate::error::{DashboardError, Result};
use crate::timer::label_for;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Stats object produced by a finished compilation.
pub trait BuildStats: Send {
    /// Whether the compilation reported errors.
    fn has_errors(&self) -> bool;

    /// Whether the compilation reported warnings.
    fn has_warnings(&self) -> bool;

    /// Full stats as JSON.
    fn to_json(&self) -> Result<Value>;

    /// Human-readable build report rendered with the given display options.
    fn render(&self, options: &StatsOptions) -> String;
}

/// Display options for rendering the stats log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOptions {
    /// Emit ANSI colors
    #[serde(default = "default_true")]
    pub colors: bool,

    /// List emitted assets
    #[serde(default = "default_true")]
    pub assets: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            colors: true,
            assets: true,
        }
    }
}

/// Pick display options: dev-server options, then global options, then the
/// `{ colors: true }` default.
pub fn resolve_stats_options(
    dev_server: Option<&StatsOptions>,
    global: Option<&StatsOptions>,
) -> StatsOptions {
    dev_server
        .or(global)
        .cloned()
        .unwrap_or_default()
}

/// A single emitted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStat {
    /// Output file name
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Plain stats record implementing [`BuildStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Content hash of the compilation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Compilation time in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
    /// Number of modules in the graph
    #[serde(default)]
    pub modules: usize,
    /// Emitted assets
    #[serde(default)]
    pub assets: Vec<AssetStat>,
    /// Error messages
    #[serde(default)]
    pub errors: Vec<String>,
    /// Warning messages
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl BuildStats for StatsSummary {
    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(DashboardError::from)
    }

    fn render(&self, options: &StatsOptions) -> String {
        let paint = |text: String, style: fn(&str) -> String| {
            if options.colors { style(&text) } else { text }
        };

        let mut lines = Vec::new();

        if let Some(hash) = &self.hash {
            lines.push(format!("Hash: {}", paint(hash.clone(), |s| s.bold().to_string())));
        }
        lines.push(format!(
            "Time: {}",
            paint(
                label_for(Duration::from_millis(self.duration_ms)),
                |s| s.bold().to_string()
            )
        ));

        if options.assets && !self.assets.is_empty() {
            let width = self.assets.iter().map(|a| a.name.len()).max().unwrap_or(0);
            for asset in &self.assets {
                lines.push(format!(
                    "  {}  {}",
                    paint(format!("{:<width$}", asset.name), |s| s.green().bold().to_string()),
                    format_size(asset.size)
                ));
            }
        }

        lines.push(format!("{} modules", self.modules));

        for error in &self.errors {
            lines.push(format!("{} {}", paint("ERROR".to_string(), |s| s.red().bold().to_string()), error));
        }
        for warning in &self.warnings {
            lines.push(format!(
                "{} {}",
                paint("WARNING".to_string(), |s| s.yellow().bold().to_string()),
                warning
            ));
        }

        lines.join("\n")
    }
}

/// Format file size in human-readable format (B, KB, MB, GB).
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}
