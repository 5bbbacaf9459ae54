//! Typed log records parsed from the monitored service's log file.

use serde::{Deserialize, Serialize};

/// One parsed log line. Immutable once created.
///
/// Malformed lines still yield a record: `service` falls back to
/// "System", `level` is absent, and `message` carries the raw line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Time-of-day portion of the line's timestamp, e.g. "11:52:08"
    pub timestamp: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub message: String,
}
