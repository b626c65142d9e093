//! SceneCut Media - external tool integration and frame input
//!
//! This crate handles:
//! - Locating ffmpeg / ffprobe
//! - Probing source metadata
//! - Extracting frames into a scratch directory
//! - Reading the numbered image sequence while it is being written

pub mod cancel;
pub mod error;
pub mod extract;
pub mod prefetch;
pub mod probe;
pub mod scratch;
pub mod sequence;
pub mod tools;

pub use cancel::CancelToken;
pub use error::{MediaError, MediaResult};
pub use extract::{ExtractConfig, ExtractionHandle, ExtractionMode, FrameExtractor};
pub use prefetch::Prefetch;
pub use probe::SourceInfo;
pub use scratch::ScratchDir;
pub use sequence::{FrameSequenceReader, PollPolicy, ProducerStatus, SequencePattern};
pub use tools::{MediaTools, ToolsConfig};
