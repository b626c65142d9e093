//! Error types for EDL assembly and output.

use scenecut_core::ScenecutError;
use thiserror::Error;

/// Errors that can occur while building or writing an EDL.
#[derive(Debug, Error)]
pub enum EdlError {
    /// Invalid cut list or timecode arithmetic failure.
    #[error(transparent)]
    Core(#[from] ScenecutError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for EDL operations.
pub type EdlResult<T> = std::result::Result<T, EdlError>;
