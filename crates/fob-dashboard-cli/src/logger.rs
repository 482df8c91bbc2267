//! Logging setup for the dashboard display.
//!
//! Log lines go to stderr so they never interleave with the rendered build
//! report on stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used with `--verbose`.
const VERBOSE_FILTER: &str = "fob_dashboard=debug,fob_dashboard_cli=debug";

/// Filter used with `--quiet`.
const QUIET_FILTER: &str = "fob_dashboard=error,fob_dashboard_cli=error";

/// Filter used when neither flag nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "fob_dashboard=info,fob_dashboard_cli=info";

/// Initialize the tracing subscriber.
///
/// Level selection, first match wins:
/// 1. `--verbose`: debug for the dashboard crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for the dashboard crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Whether colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise stdout
/// terminal capabilities decide.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stdout().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_no_color_wins_over_force_color() {
        // SAFETY: serialized test
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());

        unsafe {
            std::env::remove_var("NO_COLOR");
        }
        assert!(should_use_colors());

        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    fn test_filters_parse() {
        let _ = EnvFilter::new(VERBOSE_FILTER);
        let _ = EnvFilter::new(QUIET_FILTER);
        let _ = EnvFilter::new(DEFAULT_FILTER);
    }
}
