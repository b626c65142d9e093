//! SceneCut Core - Foundation types for scene-cut detection
//!
//! This crate provides the fundamental types used throughout SceneCut:
//! - Frame rate representation (FrameRate)
//! - Non-drop timecode arithmetic (Timecode)
//! - Decoded frames (Frame)

pub mod error;
pub mod frame;
pub mod time;
pub mod timecode;

pub use error::{Result, ScenecutError};
pub use frame::Frame;
pub use time::FrameRate;
pub use timecode::{Timecode, TimecodeFormat};
