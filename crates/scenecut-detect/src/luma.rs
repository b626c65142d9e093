//! Grayscale conversion.

use scenecut_core::Frame;

/// Single-channel f32 image on a 0–255 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct LumaPlane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl LumaPlane {
    /// Desaturate a frame. Zeroing saturation in HSV leaves every channel
    /// at the HSV value, which is `max(r, g, b)`.
    pub fn from_frame(frame: &Frame) -> Self {
        let data = frame
            .data()
            .chunks_exact(3)
            .map(|px| px[0].max(px[1]).max(px[2]) as f32)
            .collect();
        Self {
            width: frame.width() as usize,
            height: frame.height() as usize,
            data,
        }
    }
}
