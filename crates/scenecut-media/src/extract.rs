//! Frame extraction to a numbered image sequence using an FFmpeg subprocess.
//!
//! The extractor writes `<stem>_00001.jpg`, `<stem>_00002.jpg`, ... into a
//! scratch directory. The returned [`ExtractionHandle`] owns the child
//! process: it reports completion to a [`FrameSequenceReader`] and kills the
//! process if dropped early.
//!
//! [`FrameSequenceReader`]: crate::sequence::FrameSequenceReader

use crate::error::{MediaError, MediaResult};
use crate::sequence::{ProducerStatus, SequencePattern};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

/// Name of the extractor log written next to the frames.
pub const EXTRACT_LOG: &str = "extract.log";

/// How frame reading is synchronized with the extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Read while the extractor is still writing.
    #[default]
    Pipelined,
    /// Wait for the extractor to exit, then read the finished directory.
    Blocking,
}

/// Extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Integer downscale factor applied to the width (height follows the
    /// aspect ratio). 1 keeps the source resolution.
    pub downscale: u32,
    /// Deinterlace before scaling.
    pub deinterlace: bool,
    /// Zero-padded digit count of the frame index in file names.
    pub digits: usize,
    /// Image file extension (and therefore format).
    pub extension: String,
    pub mode: ExtractionMode,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            downscale: 5,
            deinterlace: true,
            digits: 5,
            extension: "jpg".into(),
            mode: ExtractionMode::default(),
        }
    }
}

/// Spawns FFmpeg to dump every video frame as an image.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    ffmpeg: PathBuf,
    config: ExtractConfig,
}

impl FrameExtractor {
    /// Create an extractor that runs the given ffmpeg binary.
    pub fn new(ffmpeg: impl Into<PathBuf>, config: ExtractConfig) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            config,
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Naming pattern of the frames this extractor writes into `dir`.
    pub fn pattern_for(&self, dir: &Path, stem: &str) -> SequencePattern {
        SequencePattern::new(dir, stem)
            .with_digits(self.config.digits)
            .with_extension(self.config.extension.clone())
    }

    /// Build the FFmpeg command arguments.
    pub fn ffmpeg_args(&self, input: &Path, output: &SequencePattern) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-nostdin".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-an".into(),
        ];

        let mut filters = Vec::new();
        if self.config.deinterlace {
            filters.push("yadif".to_string());
        }
        if self.config.downscale > 1 {
            filters.push(format!("scale=iw/{}:-1", self.config.downscale));
        }
        if !filters.is_empty() {
            args.extend_from_slice(&["-vf".into(), filters.join(",")]);
        }

        args.extend_from_slice(&[
            "-f".into(),
            "image2".into(),
            output.printf_pattern().to_string_lossy().into_owned(),
        ]);
        args
    }

    /// Start extraction in the background. Output goes to `output.dir`,
    /// which must already exist.
    pub fn spawn(&self, input: &Path, output: &SequencePattern) -> MediaResult<ExtractionHandle> {
        if !input.is_file() {
            return Err(MediaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Video file not found: {}", input.display()),
            )));
        }

        let log_path = output.dir.join(EXTRACT_LOG);
        let log = File::create(&log_path)?;
        let args = self.ffmpeg_args(input, output);
        debug!(program = %self.ffmpeg.display(), ?args, "Spawning frame extractor");

        let child = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log))
            .spawn()
            .map_err(|e| {
                MediaError::ExtractorFailed(format!(
                    "Failed to spawn {}: {e}",
                    self.ffmpeg.display()
                ))
            })?;

        info!(
            input = %input.display(),
            output = %output.dir.display(),
            pid = child.id(),
            "Frame extraction started"
        );

        Ok(ExtractionHandle {
            child: Some(child),
            log_path,
        })
    }
}

/// A running (or finished) extraction process.
#[derive(Debug)]
pub struct ExtractionHandle {
    /// `None` once the process has been reaped.
    child: Option<Child>,
    log_path: PathBuf,
}

impl ExtractionHandle {
    /// Block until the extractor exits.
    pub fn wait(mut self) -> MediaResult<()> {
        match self.child.take() {
            Some(mut child) => {
                let status = child.wait()?;
                self.check(status)
            }
            None => Ok(()),
        }
    }

    /// Non-blocking completion check; reaps the process once it exits.
    pub fn try_finish(&mut self) -> MediaResult<bool> {
        let Some(child) = self.child.as_mut() else {
            return Ok(true);
        };
        match child.try_wait()? {
            Some(status) => {
                self.child = None;
                self.check(status)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn check(&self, status: ExitStatus) -> MediaResult<()> {
        if status.success() {
            info!("Frame extraction finished");
            return Ok(());
        }
        let log = std::fs::read_to_string(&self.log_path).unwrap_or_default();
        let tail: Vec<&str> = log.lines().rev().take(5).collect();
        let detail = tail.into_iter().rev().collect::<Vec<_>>().join(" | ");
        Err(MediaError::ExtractorFailed(format!(
            "ffmpeg exited with status: {status}: {detail}"
        )))
    }
}

impl ProducerStatus for ExtractionHandle {
    fn is_finished(&mut self) -> MediaResult<bool> {
        self.try_finish()
    }
}

impl Drop for ExtractionHandle {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                warn!(pid = child.id(), "Killing unfinished frame extractor");
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}
