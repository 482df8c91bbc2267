//! Message protocol shared by the bridge and the display.
//!
//! Every lifecycle transition produces one [`Batch`]: an ordered list of
//! typed [`Message`]s that travels as a single unit. The display aggregates
//! by message type, so the order inside a batch matters but batches are
//! never interleaved.
//!
//! Wire shape of a single message:
//!
//! ```json
//! {"type": "status", "value": "Compiling"}
//! {"type": "clear"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name used for outbound batches on the transport.
pub const MESSAGE_EVENT: &str = "message";

/// Event name of the one-time display mode announcement.
pub const MODE_EVENT: &str = "mode";

/// Ordered set of messages emitted for one lifecycle transition.
pub type Batch = Vec<Message>;

/// Build status shown by the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    /// A compilation is running
    Compiling,
    /// Sources changed and the previous result is stale
    Invalidated,
    /// The build failed before producing stats
    Failed,
    /// The build finished and produced stats
    Success,
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BuildStatus::Compiling => "Compiling",
            BuildStatus::Invalidated => "Invalidated",
            BuildStatus::Failed => "Failed",
            BuildStatus::Success => "Success",
        };
        f.write_str(label)
    }
}

/// Payload of the `stats` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Whether the compilation reported errors
    pub errors: bool,
    /// Whether the compilation reported warnings
    pub warnings: bool,
    /// Bundler stats JSON, or a serialized error if it could not be produced
    pub data: Value,
}

/// One typed event inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Message {
    /// Resolved NODE_ENV of the build, sent once per connection
    NodeEnv(String),
    /// Current build status
    Status(BuildStatus),
    /// Completion ratio in `[0, 1]`
    Progress(f64),
    /// Free-text description of the current phase
    Operations(String),
    /// Reset transient panels
    Clear,
    /// Build statistics
    Stats(StatsPayload),
    /// Pre-formatted build report
    Log(String),
}

impl Message {
    /// The `type` tag this message carries on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::NodeEnv(_) => "nodeEnv",
            Message::Status(_) => "status",
            Message::Progress(_) => "progress",
            Message::Operations(_) => "operations",
            Message::Clear => "clear",
            Message::Stats(_) => "stats",
            Message::Log(_) => "log",
        }
    }
}

/// Payload of the inbound `mode` event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeOptions {
    /// The display renders a reduced view
    #[serde(default)]
    pub minimal: bool,
}

/// Serialize a batch to its wire JSON.
///
/// Both delivery paths go through this function, which is what keeps handler
/// mode and socket mode byte-identical.
pub fn encode_batch(batch: &[Message]) -> serde_json::Result<Value> {
    serde_json::to_value(batch)
}

/// Parse a batch received from the wire.
pub fn decode_batch(value: Value) -> serde_json::Result<Batch> {
    serde_json::from_value(value)
}
