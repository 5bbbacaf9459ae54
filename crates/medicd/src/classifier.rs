//! Classifier backends for log diagnosis.
//!
//! The diagnoser is polymorphic over `Classify` so the pipeline runs
//! identically against a hosted model, the offline pattern matcher,
//! or a canned fixture in tests. Backends report raw output; contract
//! enforcement (clamping, non-empty root cause) lives in the
//! diagnoser, and retry policy, if any, belongs to the backend.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use medic_common::LogRecord;
use std::time::Duration;
use tracing::info;

/// Root-cause classification capability: text in, `(root_cause,
/// confidence)` out.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, text: &str) -> Result<(String, f64)>;
}

/// Render a record window as the text handed to a classifier.
pub fn render_window(records: &[LogRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let level = r.level.as_deref().unwrap_or("-");
            format!("{} [{}] {} {}", r.timestamp, r.service, level, r.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Pattern backend (deterministic, offline)
// ============================================================================

/// Message substrings that mark a line as the probable root cause,
/// checked in order.
const FAILURE_MARKERS: &[&str] = &[
    "connectionrefused",
    "500 error",
    "critical",
    "exception",
    "timeout",
    "unavailable",
    "refused",
    "error",
];

/// Deterministic classifier: the most recent error-looking line is
/// the root cause. No network, no model; used as the default backend
/// and as the reproducible baseline in tests.
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier;

#[async_trait]
impl Classify for PatternClassifier {
    async fn classify(&self, text: &str) -> Result<(String, f64)> {
        for line in text.lines().rev() {
            let lower = line.to_lowercase();
            let is_flagged_level = lower.contains(" error ")
                || lower.contains(" critical ")
                || lower.starts_with("error")
                || lower.starts_with("critical");
            if is_flagged_level || FAILURE_MARKERS.iter().any(|m| lower.contains(m)) {
                return Ok((line.trim().to_string(), 1.0));
            }
        }
        Ok(("No error found in recent logs".to_string(), 0.0))
    }
}

// ============================================================================
// Ollama backend
// ============================================================================

/// Classifier backed by a local Ollama model.
#[derive(Debug, Clone)]
pub struct OllamaClassifier {
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OllamaClassifier {
    pub fn new(url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            timeout_secs,
        }
    }

    fn prompt(text: &str) -> String {
        format!(
            "You are an expert SRE. Analyze the following logs specifically looking for \
             errors, exceptions, or latency warnings. \
             Output ONLY valid JSON of the form \
             {{\"root_cause\": \"...\", \"confidence\": 0.0}} with confidence between \
             0.0 and 1.0. Do not include any conversational text or markdown formatting. \
             If no error is found, set confidence to 0.0.\n\nLogs:\n{}",
            text
        )
    }
}

#[async_trait]
impl Classify for OllamaClassifier {
    async fn classify(&self, text: &str) -> Result<(String, f64)> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;

        let body = serde_json::json!({
            "model": self.model,
            "prompt": Self::prompt(text),
            "stream": false
        });

        info!("Classifying {} bytes of logs with {}", text.len(), self.model);

        let response = client
            .post(format!("{}/api/generate", self.url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Ollama request failed: {}", response.status()));
        }

        let json: serde_json::Value = response.json().await?;
        let response_text = json
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or_else(|| anyhow!("Ollama response missing 'response' field"))?;

        parse_classification(response_text)
    }
}

/// Parse a model reply into `(root_cause, confidence)`. Tolerates
/// code fences some models wrap JSON in despite instructions.
fn parse_classification(reply: &str) -> Result<(String, f64)> {
    let trimmed = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| anyhow!("Model reply is not valid JSON: {}", e))?;

    let root_cause = value
        .get("root_cause")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Model reply missing 'root_cause'"))?
        .to_string();
    let confidence = value
        .get("confidence")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| anyhow!("Model reply missing 'confidence'"))?;

    Ok((root_cause, confidence))
}

// ============================================================================
// Fixture backend (replay)
// ============================================================================

/// Replays a canned classification; lets tests drive the pipeline
/// without network access.
#[derive(Debug, Clone)]
pub struct FixtureClassifier {
    pub root_cause: String,
    pub confidence: f64,
    /// When set, classification fails with this message instead.
    pub fail_with: Option<String>,
}

impl FixtureClassifier {
    pub fn replying(root_cause: impl Into<String>, confidence: f64) -> Self {
        Self {
            root_cause: root_cause.into(),
            confidence,
            fail_with: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            root_cause: String::new(),
            confidence: 0.0,
            fail_with: Some(message.into()),
        }
    }
}

#[async_trait]
impl Classify for FixtureClassifier {
    async fn classify(&self, _text: &str) -> Result<(String, f64)> {
        match &self.fail_with {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok((self.root_cause.clone(), self.confidence)),
        }
    }
}
