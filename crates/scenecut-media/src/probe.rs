//! Media file probing to get metadata without full decode.
//!
//! Metadata comes from the banner ffprobe prints on stderr:
//!
//! ```text
//!   Duration: 00:00:10.00, start: 0.000000, bitrate: 2034 kb/s
//!     Stream #0:0(und): Video: h264 (High), yuv420p, 1920x1080 [SAR 1:1 DAR 16:9], 25 fps, 25 tbr
//!       timecode        : 01:00:00:00
//! ```

use crate::error::{MediaError, MediaResult};
use scenecut_core::{FrameRate, Timecode, TimecodeFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Information about a video file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// File path
    pub path: PathBuf,
    /// Video frame rate
    pub frame_rate: FrameRate,
    /// floor(duration × fps)
    pub total_frames: u64,
    pub width: u32,
    pub height: u32,
    /// Container duration in seconds
    pub duration_seconds: f64,
    /// Embedded start timecode, 00:00:00:00 when absent
    pub start_timecode: Timecode,
}

impl SourceInfo {
    /// Run ffprobe on `path` and parse its banner.
    pub fn probe(ffprobe: &Path, path: &Path) -> MediaResult<Self> {
        if !path.is_file() {
            return Err(MediaError::Probe(format!(
                "File not found: {}",
                path.display()
            )));
        }

        debug!(path = %path.display(), "Probing video");
        let output = Command::new(ffprobe)
            .arg("-hide_banner")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MediaError::Probe(format!("Failed to run {}: {e}", ffprobe.display())))?;

        let banner = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let reason = banner.lines().last().unwrap_or_default().trim().to_string();
            return Err(MediaError::Probe(format!(
                "ffprobe failed on {}: {reason}",
                path.display()
            )));
        }
        Self::from_ffprobe_banner(path, &banner)
    }

    /// Parse the stderr banner of `ffprobe <file>`.
    pub fn from_ffprobe_banner(path: &Path, banner: &str) -> MediaResult<Self> {
        let mut start: Option<String> = None;
        let mut duration: Option<String> = None;
        let mut video: Option<(u32, u32, f64)> = None;

        for line in banner.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("timecode") {
                if start.is_none() {
                    start = trimmed
                        .split_once(':')
                        .map(|(_, value)| value.trim().to_string());
                }
            } else if let Some(rest) = trimmed.strip_prefix("Duration:") {
                let value = rest.split(',').next().unwrap_or_default().trim();
                duration = Some(value.to_string());
            } else if trimmed.starts_with("Stream") && trimmed.contains("Video:") && video.is_none()
            {
                video = Some(parse_video_stream(trimmed)?);
            }
        }

        let (width, height, fps) =
            video.ok_or_else(|| MediaError::Probe("No video stream found".into()))?;
        let frame_rate = FrameRate::from_fps_f64(fps)?;

        let duration = duration.ok_or_else(|| MediaError::Probe("No duration found".into()))?;
        let duration_seconds = parse_duration(&duration, frame_rate)?;
        // Nudge so an exact frame boundary is not lost to f64 rounding.
        let total_frames = (duration_seconds * fps + 1e-6).floor() as u64;

        let start_timecode = match start {
            Some(text) => {
                if text.contains(';') {
                    warn!(timecode = %text, "Drop-frame start timecode read as non-drop");
                }
                Timecode::parse(&text.replace(';', ":"), frame_rate)?
            }
            None => Timecode::zero(frame_rate),
        };

        let info = Self {
            path: path.to_path_buf(),
            frame_rate,
            total_frames,
            width,
            height,
            duration_seconds,
            start_timecode,
        };
        debug!(
            fps = %info.frame_rate,
            frames = info.total_frames,
            width = info.width,
            height = info.height,
            start = %info.start_timecode,
            "Probed video"
        );
        Ok(info)
    }

    /// Timecode just past the last frame, relative to the start timecode.
    pub fn end_timecode(&self) -> MediaResult<Timecode> {
        Ok(self.start_timecode.add_frames(self.total_frames as i64)?)
    }
}

/// Extract `(width, height, fps)` from a `Stream ... Video: ...` line.
fn parse_video_stream(line: &str) -> MediaResult<(u32, u32, f64)> {
    let mut size = None;
    let mut fps = None;

    for segment in line.split(',') {
        let mut tokens = segment.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        if tokens.next() == Some("fps") {
            fps = first.parse::<f64>().ok();
        } else if size.is_none() {
            size = parse_size(first);
        }
    }

    let (width, height) =
        size.ok_or_else(|| MediaError::Probe(format!("No frame size in: {line}")))?;
    let fps = fps
        .filter(|f| *f > 0.0)
        .ok_or_else(|| MediaError::Probe(format!("No frame rate in: {line}")))?;
    Ok((width, height, fps))
}

fn parse_size(token: &str) -> Option<(u32, u32)> {
    let (w, h) = token.split_once('x')?;
    let width = w.parse().ok()?;
    let height = h.parse().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

/// `HH:MM:SS.ff` to seconds.
/// `HH:MM:SS.ff` container duration in seconds, read as a milliseconds-format
/// timecode at the stream rate.
fn parse_duration(text: &str, rate: FrameRate) -> MediaResult<f64> {
    Timecode::parse_as(text, rate, TimecodeFormat::Milliseconds)
        .map(|duration| duration.to_seconds())
        .map_err(|e| MediaError::Probe(format!("Invalid duration {text}: {e}")))
}
