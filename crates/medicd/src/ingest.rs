//! Log ingestion: tail the monitored service's log file and parse
//! lines into typed records.
//!
//! The line grammar is fixed by the log-shipping setup:
//!
//! ```text
//! <date> <time> - <LEVEL> - <message>
//! <date> <time> - [<SERVICE>] <LEVEL> - <message>
//! ```
//!
//! Fields are delimited by the literal substring `" - "`. Parsing is a
//! total function: every input line yields exactly one record, with
//! malformed lines demoted to fallback records instead of errors.

use chrono::Local;
use medic_common::LogRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Field delimiter within a log line.
const DELIMITER: &str = " - ";

/// Service tag used for lines that don't match the grammar.
const FALLBACK_SERVICE: &str = "System";

/// Read the most recent `max_lines` records from the log file,
/// most-recent-last.
///
/// A missing or unreadable file is a normal low-information state
/// (the service may simply not have logged yet), so it returns an
/// empty window rather than an error.
pub fn read_recent(path: &str, max_lines: usize) -> Vec<LogRecord> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Log file {} unreadable ({}), using empty window", path, e);
            return Vec::new();
        }
    };

    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].iter().map(|line| parse_line(line)).collect()
}

/// Parse one log line into a record. Never fails.
pub fn parse_line(line: &str) -> LogRecord {
    let parts: Vec<&str> = line.split(DELIMITER).collect();

    if parts.len() < 3 {
        // Not in the expected grammar; keep the raw line visible.
        return LogRecord {
            timestamp: time_of_day_now(),
            service: FALLBACK_SERVICE.to_string(),
            level: None,
            message: line.to_string(),
        };
    }

    let timestamp = time_of_day(parts[0]);
    let message = parts[2..].join(DELIMITER);
    let (service, level) = split_tag_and_level(parts[1], &message);

    LogRecord {
        timestamp,
        service,
        level,
        message,
    }
}

/// Time-of-day is the second space-separated token of the datetime
/// field ("2025-12-25 11:52:08" -> "11:52:08").
fn time_of_day(datetime: &str) -> String {
    datetime
        .split_whitespace()
        .nth(1)
        .unwrap_or(datetime)
        .to_string()
}

fn time_of_day_now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Extract the service and level from the middle field.
///
/// `[AGENT] INFO` carries an explicit service tag; a bare `ERROR` has
/// the service inferred from the message content.
fn split_tag_and_level(level_or_tag: &str, message: &str) -> (String, Option<String>) {
    if let Some(rest) = level_or_tag.strip_prefix('[') {
        if let Some((service, after)) = rest.split_once(']') {
            let level = after.split_whitespace().next().map(str::to_string);
            return (service.to_string(), level);
        }
    }

    let level = {
        let trimmed = level_or_tag.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };
    (infer_service(message), level)
}

/// Infer a service name from well-known message substrings.
fn infer_service(message: &str) -> String {
    if message.contains("Payment") {
        "PaymentService".to_string()
    } else if message.to_lowercase().contains("chaos") {
        "ChaosApp".to_string()
    } else {
        "App".to_string()
    }
}

/// Appends the daemon's own narration to the shared incident log, in
/// the same grammar it consumes, so a dashboard tailing the file sees
/// the agent's steps interleaved with the service's lines.
#[derive(Debug, Clone)]
pub struct IncidentLog {
    path: PathBuf,
}

impl IncidentLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one tagged line. Failures are logged and swallowed: the
    /// narration is best-effort and must never stall the pipeline.
    pub fn append(&self, tag: &str, level: &str, message: &str) {
        let line = format!(
            "{} - [{}] {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            tag,
            level,
            message
        );

        let result = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            warn!("Could not append to incident log {:?}: {}", self.path, e);
        }
    }
}
