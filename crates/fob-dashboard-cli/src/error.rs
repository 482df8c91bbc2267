//! Error handling for the dashboard display.

use fob_dashboard::DashboardError;
use miette::Report;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration or protocol errors from the dashboard library
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    /// The listener could not be bound
    #[error("Failed to listen on {address}: {source}\n\nHint: Another display may already be running; pick a different --port")]
    Bind {
        /// Address that was requested
        address: String,
        /// Underlying failure
        source: std::io::Error,
    },

    /// The child command could not be started
    #[error("Failed to run '{command}': {source}\n\nHint: Check that the command exists and is on PATH")]
    Command {
        /// Program name
        command: String,
        /// Underlying failure
        source: std::io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert CliError to a miette report.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Dashboard(DashboardError::Config(e)) => {
            miette::miette!("Configuration error: {}", e)
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fob_dashboard::ConfigError;

    #[test]
    fn test_bind_error_has_hint() {
        let err = CliError::Bind {
            address: "127.0.0.1:9838".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        let text = err.to_string();
        assert!(text.contains("127.0.0.1:9838"));
        assert!(text.contains("Hint:"));
    }

    #[test]
    fn test_config_error_report() {
        let err = CliError::from(DashboardError::from(ConfigError::InvalidValue {
            field: "port".to_string(),
            value: "0".to_string(),
            hint: "Use a port between 1 and 65535".to_string(),
        }));
        let report = cli_error_to_miette(err);
        assert!(report.to_string().starts_with("Configuration error:"));
    }
}
