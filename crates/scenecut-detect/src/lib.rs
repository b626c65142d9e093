//! SceneCut Detect - Edge Change Ratio scene-cut detection
//!
//! Frames are compared pairwise through their edge structure:
//! - Luma and Canny edge maps (`luma`, `canny`)
//! - Square dilation and whole-array mask arithmetic (`edge_map`)
//! - Marching-squares contour counting (`contours`)
//! - The ECR score (`ecr`) and the cut decision loop (`scene_cut`)

pub mod canny;
pub mod contours;
pub mod ecr;
pub mod edge_map;
pub mod error;
pub mod luma;
pub mod scene_cut;
pub mod trace;

pub use ecr::{EcrParams, EdgeSimilarity, FrameEdges};
pub use edge_map::EdgeMap;
pub use error::{DetectError, DetectResult};
pub use scene_cut::{Detection, DetectorConfig, SceneCutDetector};
pub use trace::{TraceRecord, TraceSink, TraceWriter};
