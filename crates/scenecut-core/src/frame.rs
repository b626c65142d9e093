//! Decoded video frames in CPU memory.
//!
//! Frames are packed RGB8, row-major with no padding. A frame knows its
//! 1-based position in the extracted sequence and the timecode derived
//! from that position.

use crate::error::{Result, ScenecutError};
use crate::timecode::Timecode;

/// Bytes per packed RGB8 pixel.
pub const RGB_CHANNELS: usize = 3;

/// A decoded video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 1-based index in the extracted sequence
    index: u32,
    /// Timecode of this frame
    timecode: Timecode,
    /// Frame width in pixels
    width: u32,
    /// Frame height in pixels
    height: u32,
    /// RGB8 samples, `width * height * 3` bytes
    data: Vec<u8>,
}

impl Frame {
    /// Wrap raw RGB8 samples. Fails if `data` does not hold exactly
    /// `width * height` pixels or if `index` is 0.
    pub fn from_rgb8(
        index: u32,
        timecode: Timecode,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self> {
        if index == 0 {
            return Err(ScenecutError::InvalidParameter(
                "frame indices are 1-based".into(),
            ));
        }
        let expected = width as usize * height as usize * RGB_CHANNELS;
        if data.len() != expected {
            return Err(ScenecutError::InvalidParameter(format!(
                "frame {index}: expected {expected} bytes for {width}x{height} RGB8, got {}",
                data.len()
            )));
        }
        Ok(Self {
            index,
            timecode,
            width,
            height,
            data,
        })
    }

    /// A frame filled with a single color.
    pub fn solid(index: u32, timecode: Timecode, width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * RGB_CHANNELS)
            .collect();
        Self {
            index: index.max(1),
            timecode,
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn timecode(&self) -> Timecode {
        self.timecode
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width and height.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGB8 samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the RGB8 samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The RGB sample at (x, y). Panics if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * RGB_CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}
