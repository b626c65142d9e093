//! Error types for the media subsystem.

use scenecut_core::ScenecutError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while probing, extracting or reading frames.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The extractor is still running but frame `index` did not appear
    /// within the liveness bound.
    #[error("Frame {index} ({}) did not appear within {waited:?}", .path.display())]
    ExtractionTimeout {
        index: u32,
        path: PathBuf,
        waited: Duration,
    },

    /// The sequence finished without producing a single frame.
    #[error("No frames found in {}", .dir.display())]
    EmptySequence { dir: PathBuf },

    /// A frame file exists but could not be decoded.
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Probe output could not be interpreted.
    #[error("Probe error: {0}")]
    Probe(String),

    /// A required external tool is not installed or not on PATH.
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The extraction process exited unsuccessfully or could not be spawned.
    #[error("Frame extractor failed: {0}")]
    ExtractorFailed(String),

    /// Timecode or parameter error from the core types.
    #[error(transparent)]
    Core(#[from] ScenecutError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for media operations.
pub type MediaResult<T> = std::result::Result<T, MediaError>;
