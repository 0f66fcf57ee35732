//! Session configuration.
//!
//! Defaults match the timings conversations were authored against. Hosts can
//! deserialize a `SessionConfig` or override the defaults from the
//! environment with [`SessionConfig::from_env`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::reveal::RevealTiming;

/// Environment variable overriding the default auto-advance delay (ms).
pub const AUTO_ADVANCE_ENV: &str = "COLLOQUY_AUTO_ADVANCE_MS";
/// Environment variable scaling every reveal timing (percent).
pub const REVEAL_SCALE_ENV: &str = "COLLOQUY_REVEAL_SCALE";
/// Environment variable overriding the conversation title.
pub const TITLE_ENV: &str = "COLLOQUY_TITLE";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable held something other than a non-negative integer.
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber {
        /// The offending variable.
        var: &'static str,
        /// Its raw value.
        value: String,
    },
}

/// Tunables for a dialogue session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Title shown by the presenter.
    pub title: String,
    /// Delay used when an auto-advancing node does not specify one.
    pub default_auto_advance_delay_ms: u64,
    /// Reveal sequence timing.
    pub reveal: RevealTiming,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            title: "Conversation".to_owned(),
            default_auto_advance_delay_ms: 2_000,
            reveal: RevealTiming::default(),
        }
    }
}

impl SessionConfig {
    /// Defaults overridden from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden from `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` if a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(var)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidNumber { var, value: raw })
                })
                .transpose()
        };

        let mut config = Self::default();
        if let Some(delay) = number(AUTO_ADVANCE_ENV)? {
            config.default_auto_advance_delay_ms = delay;
        }
        if let Some(percent) = number(REVEAL_SCALE_ENV)? {
            config.reveal = config.reveal.scaled(percent);
        }
        if let Some(title) = lookup(TITLE_ENV) {
            config.title = title;
        }
        Ok(config)
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replaces the reveal timing.
    #[must_use]
    pub fn with_reveal(mut self, reveal: RevealTiming) -> Self {
        self.reveal = reveal;
        self
    }
}
