//! Error types for the dashboard bridge.
//!
//! The lifecycle path (signals in, batches out) never fails: every probe that
//! can go wrong degrades to a default instead. Errors only surface from
//! configuration loading and from transport internals, and the latter are
//! swallowed by the connection manager before they reach the host build.

use serde_json::{json, Value};
use thiserror::Error;

/// Top-level error type for the dashboard bridge.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The transport could not connect to the display
    #[error("Failed to connect to dashboard at {endpoint}: {reason}")]
    Connect {
        /// Address that was dialed
        endpoint: String,
        /// Underlying failure
        reason: String,
    },

    /// The transport failed while sending or receiving a frame
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors reported by the host bundler's stats object
    #[error("Stats error: {0}")]
    Stats(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// Figment could not extract the merged configuration
    #[error("Failed to load configuration: {0}\n\nHint: Check fob-dashboard.json syntax and FOB_DASHBOARD_* variables")]
    Extract(#[from] Box<figment::Error>),
}

/// Result type alias using `DashboardError` as the default error type.
pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

/// Convert an error into a JSON value that is always safe to put on the wire.
///
/// The output has the shape `{"name", "message", "causes"}` where `causes`
/// walks the `source()` chain.
///
/// # Example
///
/// ```
/// use fob_dashboard::error::serialize_error;
///
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// let value = serialize_error(&err);
/// assert_eq!(value["message"], "disk full");
/// ```
pub fn serialize_error(error: &(dyn std::error::Error + 'static)) -> Value {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(Value::String(cause.to_string()));
        source = cause.source();
    }

    json!({
        "name": error_name(error),
        "message": error.to_string(),
        "causes": causes,
    })
}

fn error_name(error: &(dyn std::error::Error + 'static)) -> &'static str {
    if error.is::<DashboardError>() {
        "DashboardError"
    } else if error.is::<ConfigError>() {
        "ConfigError"
    } else if error.is::<std::io::Error>() {
        "IoError"
    } else if error.is::<serde_json::Error>() {
        "JsonError"
    } else {
        "Error"
    }
}
