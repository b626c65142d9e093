//! Error types for scene-cut detection.

use scenecut_core::ScenecutError;
use scenecut_media::MediaError;
use thiserror::Error;

/// Errors that can occur while scoring frames or running detection.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Two frames being compared differ in size.
    #[error("Frame dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    /// The frame source produced no frames at all.
    #[error("No frames to analyze")]
    EmptySequence,

    /// Frame source failure, surfaced unchanged.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Timecode or parameter error.
    #[error(transparent)]
    Core(#[from] ScenecutError),

    /// Failure writing the trace.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for detection operations.
pub type DetectResult<T> = std::result::Result<T, DetectError>;
