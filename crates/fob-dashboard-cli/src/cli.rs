//! Command-line interface for the dashboard display.

use clap::Parser;
use std::path::PathBuf;

/// Fob dashboard - watch your build in a separate terminal
#[derive(Parser, Debug)]
#[command(
    name = "fob-dashboard",
    version,
    about = "Display build progress streamed by the fob dashboard plugin",
    long_about = "Listens for the fob dashboard plugin and renders build status, progress,\n\
                  problems and the build report as they happen.\n\
                  Anything after `--` is run as a child process that can find the display\n\
                  through FOB_DASHBOARD_HOST and FOB_DASHBOARD_PORT."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Host to listen on (overrides config and FOB_DASHBOARD_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and FOB_DASHBOARD_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Only print status changes and problem counts
    #[arg(short, long)]
    pub minimal: bool,

    /// Path to fob-dashboard.json
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command to run while the display is up
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
