//! Colloquy demo: host error types.

use colloquy_core::error::{DialogueError, GraphError};
use colloquy_dialogue::config::ConfigError;
use thiserror::Error;

/// Startup and runtime errors for the terminal host.
#[derive(Debug, Error)]
pub enum DemoError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The built-in scene failed validation.
    #[error("scene error: {0}")]
    Scene(#[from] GraphError),

    /// The conversation ended on a fatal error.
    #[error("dialogue error: {0}")]
    Dialogue(#[from] DialogueError),

    /// Reading input failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
