//! Workflow configuration.
//!
//! Configuration is read once at process startup, from a TOML document plus
//! a small set of environment overrides, and is immutable afterwards. In
//! particular the run mode is fixed for the lifetime of the process; stages
//! never consult the environment mid-run.
//!
//! Every section has defaults, so an empty document (or no file at all) is a
//! valid configuration that runs in demo mode.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SentioError, SentioResult};
use crate::feedback::DEFAULT_MAX_FEEDBACK_CHARS;

/// Which generation capability backs the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Deterministic keyword-driven generator, no network, no credentials.
    Demo,
    /// Real text-generation provider over HTTP.
    Live,
}

impl RunMode {
    /// Parse a mode string as found in config files or `SENTIO_MODE`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "demo" => Some(Self::Demo),
            "live" => Some(Self::Live),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Live => "live",
        }
    }
}

impl Default for RunMode {
    fn default() -> Self {
        Self::Demo
    }
}

/// Bounds applied to inputs and stage outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted feedback length, in characters.
    pub max_feedback_chars: usize,
    /// Maximum number of themes kept after deduplication.
    pub max_themes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_feedback_chars: DEFAULT_MAX_FEEDBACK_CHARS,
            max_themes: 8,
        }
    }
}

/// Per-run execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Overall wall-clock deadline for one run, in milliseconds.
    pub deadline_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { deadline_ms: 30_000 }
    }
}

/// Settings for the live generation provider.
///
/// The API key itself never appears in configuration files; `api_key_env`
/// names the environment variable it is read from at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the provider API, without a trailing slash.
    pub base_url: String,
    /// Model identifier passed on every generation call.
    pub model: String,
    /// Per-request timeout, in milliseconds.
    pub request_timeout_ms: u64,
    /// Attempts per generation call, including the first. Clamped to 1..=5
    /// by the live client.
    pub max_retries: u32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_ms: 20_000,
            max_retries: 3,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Top-level configuration for the analysis workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub mode: RunMode,
    pub limits: LimitsConfig,
    pub run: RunConfig,
    pub provider: ProviderConfig,
}

impl WorkflowConfig {
    /// Parse `s` as a TOML workflow configuration.
    ///
    /// Returns `SentioError::Config` if the TOML is malformed or does not
    /// match the expected schema. Missing sections take their defaults.
    pub fn from_toml_str(s: &str) -> SentioResult<Self> {
        toml::from_str(s).map_err(|e| SentioError::Config {
            reason: format!("failed to parse workflow config TOML: {e}"),
        })
    }

    /// Read the file at `path` and parse it as workflow configuration.
    pub fn from_file(path: &Path) -> SentioResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SentioError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration for a process: the given file if any, defaults
    /// otherwise, then environment overrides.
    pub fn load(path: Option<&Path>) -> SentioResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_mode_override(std::env::var("SENTIO_MODE").ok().as_deref())?;
        Ok(config)
    }

    /// Apply a raw `SENTIO_MODE` value on top of the file-level mode.
    ///
    /// `None` (variable unset) leaves the mode untouched; an unparseable
    /// value is a configuration error rather than a silent fallback.
    pub fn apply_mode_override(&mut self, raw: Option<&str>) -> SentioResult<()> {
        if let Some(raw) = raw {
            self.mode = RunMode::parse(raw).ok_or_else(|| SentioError::Config {
                reason: format!("unrecognized SENTIO_MODE value '{raw}' (expected 'demo' or 'live')"),
            })?;
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
