use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Engine options. Every field has a default, so a config file only needs the
/// keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Give witness markers a debug label (`if`, `each`, ...) instead of an
    /// empty one.
    pub label_markers: bool,
    /// Skip a diff entirely when the new sentence is the very allocation that
    /// was rendered last time.
    pub reuse_identical: bool,
    /// Compare `prop` values against the host's live property rather than the
    /// previous argument. Keeps user-edited inputs in sync with state.
    pub live_properties: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { label_markers: true, reuse_identical: true, live_properties: true }
    }
}

const ENV_LABEL_MARKERS: &str = "LEXIDOM_LABEL_MARKERS";
const ENV_REUSE_IDENTICAL: &str = "LEXIDOM_REUSE_IDENTICAL";
const ENV_LIVE_PROPERTIES: &str = "LEXIDOM_LIVE_PROPERTIES";

impl EngineConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&source)
    }

    /// Apply `LEXIDOM_*` overrides from the environment on top of `self`.
    pub fn from_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        for (var, field) in [
            (ENV_LABEL_MARKERS, &mut self.label_markers),
            (ENV_REUSE_IDENTICAL, &mut self.reuse_identical),
            (ENV_LIVE_PROPERTIES, &mut self.live_properties),
        ] {
            if let Some(value) = lookup(var) {
                *field = parse_flag(var, &value)?;
            }
        }
        Ok(self)
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { var, value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "label_markers": false }"#).unwrap();
        assert!(!config.label_markers);
        assert!(config.reuse_identical);
        assert!(config.live_properties);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(EngineConfig::from_json("{ label_markers: 1 }"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::default()
            .with_overrides(|var| (var == ENV_REUSE_IDENTICAL).then(|| "off".to_string()))
            .unwrap();
        assert!(!config.reuse_identical);
        assert!(config.label_markers);

        let error = EngineConfig::default()
            .with_overrides(|var| (var == ENV_LIVE_PROPERTIES).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidEnv { var: ENV_LIVE_PROPERTIES, .. }));
    }
}
