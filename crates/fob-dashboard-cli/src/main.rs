//! fob-dashboard - renders the build event stream in a separate terminal.

use clap::Parser;
use fob_dashboard_cli::{cli, error, logger, run};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let code = run::execute(args)
        .await
        .map_err(error::cli_error_to_miette)?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
