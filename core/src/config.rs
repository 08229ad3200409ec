//! Client configuration: defaults, optional TOML file, environment overrides.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, then the
//! `CHARACTER_*` environment variables below.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::client::DEFAULT_BASE_URL;
use crate::detail::StalePolicy;
use crate::list::DEFAULT_END_REACHED_THRESHOLD;
use crate::present::{Labels, Locale};

pub const ENV_BASE_URL: &str = "CHARACTER_API_BASE_URL";
pub const ENV_END_THRESHOLD: &str = "CHARACTER_END_THRESHOLD";
pub const ENV_LOCALE: &str = "CHARACTER_LOCALE";
pub const ENV_STALE_POLICY: &str = "CHARACTER_STALE_POLICY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub end_reached_threshold: f32,
    pub locale: Locale,
    pub stale_policy: StalePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            end_reached_threshold: DEFAULT_END_REACHED_THRESHOLD,
            locale: Locale::default(),
            stale_policy: StalePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = lookup(ENV_END_THRESHOLD) {
            self.end_reached_threshold = v.trim().parse::<f32>().map_err(|e: std::num::ParseFloatError| {
                ConfigError::InvalidValue {
                    key: ENV_END_THRESHOLD,
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(v) = lookup(ENV_LOCALE) {
            self.locale = v
                .parse::<Locale>()
                .map_err(|message| ConfigError::InvalidValue { key: ENV_LOCALE, message })?;
        }
        if let Some(v) = lookup(ENV_STALE_POLICY) {
            self.stale_policy = v
                .trim()
                .parse::<StalePolicy>()
                .map_err(|message| ConfigError::InvalidValue { key: ENV_STALE_POLICY, message })?;
        }
        self.validate()
    }

    /// Replace the base URL, e.g. from a command-line flag.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<(), ConfigError> {
        let previous = std::mem::replace(&mut self.base_url, base_url.into());
        if let Err(e) = self.validate() {
            self.base_url = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn labels(&self) -> Labels {
        Labels::for_locale(self.locale)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "base_url",
                message: "must not be empty".to_string(),
            });
        }
        if !(self.end_reached_threshold.is_finite() && self.end_reached_threshold >= 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "end_reached_threshold",
                message: format!("{} is not a non-negative number", self.end_reached_threshold),
            });
        }
        Ok(())
    }
}
