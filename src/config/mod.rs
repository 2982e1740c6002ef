//! Configuration — YAML settings file plus the environment secret.
//!
//! Everything except the API key lives in an optional YAML file; a missing
//! file means defaults. The key itself is only ever read from the
//! environment, and its absence is a user-visible condition handled by the
//! translation client, not a startup crash.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lang::Language;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Model used for translation completions.
pub const DEFAULT_MODEL: &str = "gemini-flash-lite-latest";

/// Quiet interval before a text edit is considered settled.
pub const DEFAULT_QUIET_INTERVAL_MS: u64 = 600;

/// Errors from loading the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid language: '{0}'")]
    Language(String),
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Debounce quiet interval in milliseconds.
    pub quiet_interval_ms: u64,
    /// Initial source language (name or ISO code).
    pub source_lang: String,
    /// Initial target language (name or ISO code).
    pub target_lang: String,
    /// External speech command configuration.
    pub speech: SpeechConfig,
}

/// External speech engine commands. Each is a program name (resolved on
/// PATH) invoked with the locale tag as its argument; unset means the
/// capability is unavailable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Text-to-speech: invoked as `<command> <locale-tag>` with the text on stdin.
    pub synthesizer_command: Option<String>,
    /// Speech-to-text: invoked as `<command> <locale-tag>`, one transcript on stdout.
    pub recognizer_command: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            quiet_interval_ms: DEFAULT_QUIET_INTERVAL_MS,
            source_lang: "english".into(),
            target_lang: "korean".into(),
            speech: SpeechConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Load settings from a file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parsed initial source language.
    pub fn source_language(&self) -> Result<Language, ConfigError> {
        Language::from_str_lc(&self.source_lang)
            .map_err(|_| ConfigError::Language(self.source_lang.clone()))
    }

    /// Parsed initial target language.
    pub fn target_language(&self) -> Result<Language, ConfigError> {
        Language::from_str_lc(&self.target_lang)
            .map_err(|_| ConfigError::Language(self.target_lang.clone()))
    }

    /// Debounce quiet interval as a `Duration`.
    pub fn quiet_interval(&self) -> Duration {
        Duration::from_millis(self.quiet_interval_ms)
    }
}

/// Read the API key from the environment. Empty values count as unset.
pub fn api_key_from_env() -> Option<String> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => None,
    }
}
