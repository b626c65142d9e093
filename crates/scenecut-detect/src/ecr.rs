//! Edge Change Ratio between two frames.
//!
//! Each frame is reduced to an edge map. A frame's edges that lie outside
//! the dilated edges of the other frame are "exiting" (or "entering") edges;
//! the score is the larger of the two exiting fractions, measured in
//! contour counts, as a percentage.

use crate::canny::Canny;
use crate::contours::count_contours;
use crate::edge_map::EdgeMap;
use crate::error::{DetectError, DetectResult};
use crate::luma::LumaPlane;
use scenecut_core::Frame;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Edge Change Ratio parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcrParams {
    /// Gaussian sigma of the Canny detector.
    pub sigma: f32,
    /// Hysteresis low threshold (0–255 scale).
    pub low_threshold: f32,
    /// Hysteresis high threshold (0–255 scale).
    pub high_threshold: f32,
    /// Side of the square dilation footprint, in pixels.
    pub dilation: usize,
    /// Iso-level at which contours are traced.
    pub edge_level: f32,
    /// Decimal places kept in the score.
    pub precision: u32,
}

impl Default for EcrParams {
    fn default() -> Self {
        Self {
            sigma: 3.0,
            low_threshold: 20.0,
            high_threshold: 80.0,
            dilation: 24,
            edge_level: 10.0,
            precision: 2,
        }
    }
}

/// Per-frame intermediate results, reusable for the next comparison.
#[derive(Debug, Clone)]
pub struct FrameEdges {
    /// Edges 0, background 255.
    inverted: EdgeMap,
    dilated: EdgeMap,
    contours: usize,
}

impl FrameEdges {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.inverted.width as u32, self.inverted.height as u32)
    }
}

/// Scores frame pairs with the Edge Change Ratio.
#[derive(Debug, Clone, Default)]
pub struct EdgeSimilarity {
    params: EcrParams,
}

impl EdgeSimilarity {
    pub fn new(params: EcrParams) -> Self {
        Self { params }
    }

    /// Score in `[0, 100]`; 0 means the edge structure did not change.
    pub fn score(&self, a: &Frame, b: &Frame) -> DetectResult<f64> {
        check_dimensions(a.dimensions(), b.dimensions())?;
        let (edges_a, edges_b) = rayon::join(|| self.analyze(a), || self.analyze(b));
        self.compare(&edges_a, &edges_b)
    }

    /// Edge pipeline for one frame: luma, Canny, invert, dilate, contours.
    pub fn analyze(&self, frame: &Frame) -> FrameEdges {
        let p = &self.params;
        let luma = LumaPlane::from_frame(frame);
        let edges = Canny::new(p.sigma, p.low_threshold, p.high_threshold).detect(&luma);
        let inverted = edges.invert();
        let contours = count_contours(&inverted, p.edge_level);
        let dilated = edges.dilate_square(p.dilation);
        trace!(
            index = frame.index(),
            edge_pixels = edges.count_on(),
            contours,
            "Analyzed frame edges"
        );
        FrameEdges {
            inverted,
            dilated,
            contours,
        }
    }

    /// Score two analyzed frames.
    pub fn compare(&self, a: &FrameEdges, b: &FrameEdges) -> DetectResult<f64> {
        check_dimensions(a.dimensions(), b.dimensions())?;
        if a.contours == 0 || b.contours == 0 {
            return Ok(0.0);
        }

        let level = self.params.edge_level;
        let (exiting, entering) = rayon::join(
            || count_contours(&a.inverted.saturating_add(&b.dilated), level),
            || count_contours(&b.inverted.saturating_add(&a.dilated), level),
        );

        let ratio = (exiting as f64 / a.contours as f64)
            .max(entering as f64 / b.contours as f64)
            .clamp(0.0, 1.0);
        Ok(round_to(ratio * 100.0, self.params.precision))
    }
}

fn check_dimensions(left: (u32, u32), right: (u32, u32)) -> DetectResult<()> {
    if left != right {
        return Err(DetectError::DimensionMismatch { left, right });
    }
    Ok(())
}

fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision.min(12) as i32);
    (value * scale).round() / scale
}
