//! Frame rate representation.
//!
//! Frame rates are kept as rational numbers so that NTSC rates such as
//! 30000/1001 stay exact. Timecodes count frames against the *nominal*
//! timebase (the rate rounded to the nearest integer).

use crate::error::{Result, ScenecutError};
use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame rate as a rational number (e.g., 24000/1001 for 23.976 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 24000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate. Callers should pass a reduced fraction;
    /// two rates are only equal when numerator and denominator both match.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Build a frame rate from a floating-point fps value as reported by
    /// container metadata. NTSC rates are snapped to their exact fractions.
    pub fn from_fps_f64(fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ScenecutError::InvalidParameter(format!(
                "frame rate must be positive, got {fps}"
            )));
        }

        for ntsc in [Self::FPS_23_976, Self::FPS_29_97, Self::FPS_59_94] {
            if (ntsc.to_fps_f64() - fps).abs() < 0.005 {
                return Ok(ntsc);
            }
        }

        let ratio = Rational64::approximate_float(fps).ok_or_else(|| {
            ScenecutError::InvalidParameter(format!("frame rate {fps} is not representable"))
        })?;
        let (numer, denom) = (*ratio.numer(), *ratio.denom());
        match (u32::try_from(numer), u32::try_from(denom)) {
            (Ok(n), Ok(d)) if n > 0 && d > 0 => Ok(Self::new(n, d)),
            _ => Err(ScenecutError::InvalidParameter(format!(
                "frame rate {fps} is out of range"
            ))),
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// The rate as an exact rational.
    #[inline]
    pub fn as_rational(self) -> Rational64 {
        Rational64::new(self.numerator as i64, self.denominator as i64)
    }

    /// Frames per timecode second: the rate rounded to the nearest integer
    /// (30 for 29.97 in non-drop counting). Never zero.
    #[inline]
    pub fn timebase(self) -> u32 {
        (self.to_fps_f64().round() as u32).max(1)
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_59_94: Self = Self::new(60000, 1001);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_25
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}
