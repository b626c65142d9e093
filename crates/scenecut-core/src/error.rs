//! Error types for SceneCut.

use crate::time::FrameRate;
use thiserror::Error;

/// Main error type for timecode and frame operations.
#[derive(Error, Debug)]
pub enum ScenecutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed timecode or numeric text. Never coerced to a default.
    #[error("Malformed timecode '{input}': {reason}")]
    Format { input: String, reason: String },

    /// Arithmetic that would produce a negative or otherwise invalid timecode.
    #[error("Timecode out of range: {0}")]
    Range(String),

    #[error("Incompatible frame rates: {left} vs {right}")]
    IncompatibleRate { left: FrameRate, right: FrameRate },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ScenecutError {
    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for SceneCut core operations.
pub type Result<T> = std::result::Result<T, ScenecutError>;
