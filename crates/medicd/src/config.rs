//! Configuration management for medicd.
//!
//! Loads settings from /etc/medic/config.toml (overridable via the
//! MEDIC_CONFIG environment variable) or uses defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/medic/config.toml";

/// Which classifier backend diagnoses log windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierBackend {
    /// Deterministic offline pattern matcher
    Pattern,
    /// Local Ollama model
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicConfig {
    /// Address the HTTP API binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Shared log file the monitored service writes to
    #[serde(default = "default_log_path")]
    pub log_path: String,

    /// How many recent log lines a diagnosis window covers
    #[serde(default = "default_max_log_lines")]
    pub max_log_lines: usize,

    /// Identifier of the monitored service (plan target)
    #[serde(default = "default_target_service")]
    pub target_service: String,

    /// Base URL of the monitored service's control endpoints
    #[serde(default = "default_target_base_url")]
    pub target_base_url: String,

    /// Minimum confidence for an automatic remediation action
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Timeout for the outbound remediation call
    #[serde(default = "default_execute_timeout")]
    pub execute_timeout_secs: u64,

    #[serde(default = "default_classifier_backend")]
    pub classifier_backend: ClassifierBackend,

    /// Ollama API base URL (ollama backend only)
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Model used for log classification (ollama backend only)
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Classification request timeout
    #[serde(default = "default_classify_timeout")]
    pub classify_timeout_secs: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8001".to_string()
}

fn default_log_path() -> String {
    "/logs/service.log".to_string()
}

fn default_max_log_lines() -> usize {
    50
}

fn default_target_service() -> String {
    "chaos-app".to_string()
}

fn default_target_base_url() -> String {
    "http://chaos-app:8000".to_string()
}

fn default_confidence_threshold() -> f64 {
    0.8
}

fn default_execute_timeout() -> u64 {
    5
}

fn default_classifier_backend() -> ClassifierBackend {
    ClassifierBackend::Pattern
}

fn default_ollama_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5:7b-instruct".to_string()
}

fn default_classify_timeout() -> u64 {
    30
}

impl Default for MedicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_path: default_log_path(),
            max_log_lines: default_max_log_lines(),
            target_service: default_target_service(),
            target_base_url: default_target_base_url(),
            confidence_threshold: default_confidence_threshold(),
            execute_timeout_secs: default_execute_timeout(),
            classifier_backend: default_classifier_backend(),
            ollama_url: default_ollama_url(),
            ollama_model: default_ollama_model(),
            classify_timeout_secs: default_classify_timeout(),
        }
    }
}

impl MedicConfig {
    /// Load config from the default path or MEDIC_CONFIG override.
    pub fn load() -> Self {
        let path = std::env::var("MEDIC_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load config from a specific path, falling back to defaults.
    pub fn load_from(path: &str) -> Self {
        if !Path::new(path).exists() {
            warn!("Config file {} not found, using defaults", path);
            return Self::default();
        }

        match Self::parse_file(path) {
            Ok(config) => {
                info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Using defaults", path, e);
                Self::default()
            }
        }
    }

    fn parse_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MedicConfig::default();
        assert_eq!(config.max_log_lines, 50);
        assert!((config.confidence_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.execute_timeout_secs, 5);
        assert_eq!(config.classifier_backend, ClassifierBackend::Pattern);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = MedicConfig::load_from("/nonexistent/medic.toml");
        assert_eq!(config.listen_addr, default_listen_addr());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "target_service = \"payments\"\nconfidence_threshold = 0.9"
        )
        .unwrap();

        let config = MedicConfig::load_from(file.path().to_str().unwrap());
        assert_eq!(config.target_service, "payments");
        assert!((config.confidence_threshold - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.max_log_lines, 50);
    }
}
