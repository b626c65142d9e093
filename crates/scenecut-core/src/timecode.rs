//! Frame-accurate non-drop timecode.
//!
//! A [`Timecode`] is a playback position bound to a [`FrameRate`]. It is a
//! plain `Copy` value: every arithmetic operation returns a new timecode.
//! Internally it is a frame count against the nominal timebase, so the
//! `HH:MM:SS:FF` fields are always normalized.

use crate::error::{Result, ScenecutError};
use crate::time::FrameRate;
use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// How the last field of a timecode string is to be read.
///
/// The separator before the last field is the tag: `HH:MM:SS:FF` carries a
/// frame number, `HH:MM:SS.fff` carries fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimecodeFormat {
    /// `HH:MM:SS:FF`, last field is a frame index.
    Frames,
    /// `HH:MM:SS.fff`, last field is a decimal fraction of a second.
    Milliseconds,
}

impl TimecodeFormat {
    /// Determine the format from the separators present in `text`.
    pub fn detect(text: &str) -> Result<Self> {
        let text = text.trim();
        match text.matches(':').count() {
            3 if !text.contains('.') => Ok(Self::Frames),
            2 if text.contains('.') => Ok(Self::Milliseconds),
            _ => Err(ScenecutError::format(
                text,
                "expected HH:MM:SS:FF or HH:MM:SS.fff",
            )),
        }
    }
}

/// A non-drop-frame timecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timecode {
    /// Frames since 00:00:00:00 at the nominal timebase.
    total_frames: u64,
    rate: FrameRate,
}

impl Timecode {
    /// 00:00:00:00 at the given rate.
    #[inline]
    pub const fn zero(rate: FrameRate) -> Self {
        Self {
            total_frames: 0,
            rate,
        }
    }

    /// Create a timecode from an absolute frame count.
    #[inline]
    pub const fn from_frames(total_frames: u64, rate: FrameRate) -> Self {
        Self { total_frames, rate }
    }

    /// Create a timecode from its fields. Out-of-range fields roll over
    /// (e.g. 25 frames at 25 fps become one second).
    pub fn from_components(
        hours: u64,
        minutes: u64,
        seconds: u64,
        frames: u64,
        rate: FrameRate,
    ) -> Result<Self> {
        let base = rate.timebase() as u64;
        hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(minutes))
            .and_then(|m| m.checked_mul(60))
            .and_then(|s| s.checked_add(seconds))
            .and_then(|s| s.checked_mul(base))
            .and_then(|f| f.checked_add(frames))
            .map(|total| Self::from_frames(total, rate))
            .ok_or_else(|| {
                ScenecutError::Range(format!(
                    "{hours}:{minutes}:{seconds}:{frames} overflows the frame counter"
                ))
            })
    }

    /// Parse `HH:MM:SS:FF` or `HH:MM:SS.fff`, choosing by separator.
    pub fn parse(text: &str, rate: FrameRate) -> Result<Self> {
        let format = TimecodeFormat::detect(text)?;
        Self::parse_as(text, rate, format)
    }

    /// Parse `text`, requiring it to carry the given format.
    ///
    /// For [`TimecodeFormat::Milliseconds`] the frame number is
    /// `round(fps * fraction)`.
    pub fn parse_as(text: &str, rate: FrameRate, format: TimecodeFormat) -> Result<Self> {
        let text = text.trim();
        match format {
            TimecodeFormat::Frames => {
                let fields: Vec<&str> = text.split(':').collect();
                if fields.len() != 4 {
                    return Err(ScenecutError::format(
                        text,
                        format!("expected 4 fields, found {}", fields.len()),
                    ));
                }
                let h = parse_field(text, fields[0])?;
                let m = parse_field(text, fields[1])?;
                let s = parse_field(text, fields[2])?;
                let f = parse_field(text, fields[3])?;
                Self::from_components(h, m, s, f, rate)
            }
            TimecodeFormat::Milliseconds => {
                let fields: Vec<&str> = text.split(':').collect();
                if fields.len() != 3 {
                    return Err(ScenecutError::format(
                        text,
                        format!("expected 3 fields, found {}", fields.len()),
                    ));
                }
                let (secs, fraction) = fields[2]
                    .split_once('.')
                    .ok_or_else(|| ScenecutError::format(text, "missing fractional seconds"))?;
                let h = parse_field(text, fields[0])?;
                let m = parse_field(text, fields[1])?;
                let s = parse_field(text, secs)?;
                // Validates the digits; the value itself is read as a decimal fraction.
                parse_field(text, fraction)?;
                let fraction: f64 = format!("0.{fraction}")
                    .parse()
                    .map_err(|_| ScenecutError::format(text, "invalid fractional seconds"))?;
                let frames = (rate.to_fps_f64() * fraction).round() as u64;
                Self::from_components(h, m, s, frames, rate)
            }
        }
    }

    /// The frame rate this timecode is bound to.
    #[inline]
    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    /// Absolute frame count since 00:00:00:00.
    #[inline]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    #[inline]
    pub fn hours(&self) -> u64 {
        self.total_frames / (self.base() * 3600)
    }

    #[inline]
    pub fn minutes(&self) -> u64 {
        (self.total_frames / (self.base() * 60)) % 60
    }

    #[inline]
    pub fn seconds(&self) -> u64 {
        (self.total_frames / self.base()) % 60
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.total_frames % self.base()
    }

    /// `hours*3600 + minutes*60 + seconds + frames/fps`.
    pub fn to_seconds(&self) -> f64 {
        let whole = (self.total_frames / self.base()) as f64;
        let partial = Rational64::from_integer(self.frames() as i64) / self.rate.as_rational();
        whole + *partial.numer() as f64 / *partial.denom() as f64
    }

    /// Return a new timecode `delta` frames away. Fails with a range error
    /// if the result would fall before 00:00:00:00.
    pub fn add_frames(&self, delta: i64) -> Result<Self> {
        let total = self.total_frames as i128 + delta as i128;
        u64::try_from(total)
            .map(|total| Self::from_frames(total, self.rate))
            .map_err(|_| ScenecutError::Range(format!("{self} {delta:+} frames")))
    }

    /// Sum of two timecodes (used to re-base an offset onto a start point).
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.require_same_rate(other)?;
        self.total_frames
            .checked_add(other.total_frames)
            .map(|total| Self::from_frames(total, self.rate))
            .ok_or_else(|| ScenecutError::Range(format!("{self} + {other}")))
    }

    /// Signed frame distance `self - other`.
    pub fn frames_since(&self, other: &Self) -> Result<i64> {
        self.require_same_rate(other)?;
        let delta = self.total_frames as i128 - other.total_frames as i128;
        i64::try_from(delta).map_err(|_| ScenecutError::Range(format!("{self} - {other}")))
    }

    /// Compare two timecodes; they must share a frame rate.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        self.require_same_rate(other)?;
        Ok(self.total_frames.cmp(&other.total_frames))
    }

    fn require_same_rate(&self, other: &Self) -> Result<()> {
        if self.rate == other.rate {
            Ok(())
        } else {
            Err(ScenecutError::IncompatibleRate {
                left: self.rate,
                right: other.rate,
            })
        }
    }

    #[inline]
    fn base(&self) -> u64 {
        self.rate.timebase() as u64
    }
}

impl PartialOrd for Timecode {
    /// `None` when the rates differ.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.frames()
        )
    }
}

fn parse_field(input: &str, field: &str) -> Result<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScenecutError::format(
            input,
            format!("'{field}' is not a non-negative integer"),
        ));
    }
    field
        .parse()
        .map_err(|_| ScenecutError::format(input, format!("'{field}' is too large")))
}
