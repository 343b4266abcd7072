// Error types for configuration loading and asset rendering.

use chordbook_theory::TheoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid theory tables: {0}")]
    Tables(#[from] TheoryError),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode MIDI: {0}")]
    Midi(String),

    #[error("`{tool}` not found on PATH")]
    ToolMissing { tool: String },

    #[error("`{tool}` exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },
}
