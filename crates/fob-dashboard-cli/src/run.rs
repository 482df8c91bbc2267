//! The display's main loop.
//!
//! 1. Load configuration, apply `--host` / `--port`
//! 2. Bind the listener and start accepting plugin connections
//! 3. Spawn the child command, if any, pointed at the listener
//! 4. Render batches until the child exits or Ctrl+C

use crate::cli::Cli;
use crate::display::{DisplayState, Renderer};
use crate::error::{CliError, Result};
use crate::logger::should_use_colors;
use crate::server::DisplayServer;
use crate::ui;
use fob_dashboard::DashboardConfig;
use fob_dashboard::config::ENV_PREFIX;
use std::net::SocketAddr;
use std::process::ExitStatus;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Exit code reported after Ctrl+C.
const INTERRUPTED: i32 = 130;

/// Run the display. Returns the process exit code.
pub async fn execute(args: Cli) -> Result<i32> {
    let config = resolve_config(&args)?;

    let server = DisplayServer::bind(&config.host, config.port, args.minimal).await?;
    let address = server.local_addr()?;
    ui::info(&format!("Dashboard listening on {}", address));

    let (batches_tx, mut batches) = mpsc::unbounded_channel();
    let server_task = tokio::spawn(server.run(batches_tx));

    let mut child = match args.command.split_first() {
        Some((program, rest)) => Some(spawn_command(program, rest, address)?),
        None => {
            ui::info("Waiting for builds, press Ctrl+C to stop");
            None
        }
    };

    let colors = !args.no_color && should_use_colors();
    let renderer = Renderer::new(args.minimal, colors);
    let mut state = DisplayState::new();

    let code = loop {
        tokio::select! {
            Some(batch) = batches.recv() => {
                let changed = state.apply(&batch);
                renderer.render(&state, &batch, changed);
            }
            status = wait_child(&mut child) => {
                break exit_code(status?);
            }
            _ = tokio::signal::ctrl_c() => {
                break INTERRUPTED;
            }
        }
    };

    renderer.finish();
    server_task.abort();

    if code == 0 {
        ui::success("Done");
    } else if code == INTERRUPTED {
        ui::warning("Interrupted");
    } else {
        ui::error(&format!("Command exited with code {}", code));
    }
    Ok(code)
}

/// Load configuration and apply command-line overrides.
pub fn resolve_config(args: &Cli) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load(args.config.as_deref())?;

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    config.validate()?;
    Ok(config)
}

fn spawn_command(program: &str, args: &[String], address: SocketAddr) -> Result<Child> {
    tracing::debug!(program, ?args, "Spawning command");

    Command::new(program)
        .args(args)
        .env(format!("{}HOST", ENV_PREFIX), address.ip().to_string())
        .env(format!("{}PORT", ENV_PREFIX), address.port().to_string())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CliError::Command {
            command: program.to_string(),
            source,
        })
}

async fn wait_child(child: &mut Option<Child>) -> Result<ExitStatus> {
    match child {
        Some(child) => Ok(child.wait().await?),
        None => std::future::pending().await,
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    // Killed by a signal
    status.code().unwrap_or(1)
}
