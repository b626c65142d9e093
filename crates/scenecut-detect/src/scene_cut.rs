//! Scene-cut detection over an ordered frame stream.
//!
//! Each frame is scored against its predecessor with the Edge Change Ratio.
//! A score above the threshold marks the current frame as the first frame
//! of a new shot, subject to a minimum distance from the previous cut.

use crate::ecr::{EcrParams, EdgeSimilarity, FrameEdges};
use crate::error::{DetectError, DetectResult};
use crate::trace::{TraceRecord, TraceSink};
use scenecut_core::{Frame, Timecode};
use scenecut_media::MediaResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for scene-cut detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// ECR score a comparison must exceed to declare a cut (default: 80).
    pub threshold: f64,
    /// Minimum number of frames between accepted cuts (default: 2).
    /// 0 and 1 disable suppression.
    pub min_cut_distance: u64,
    /// Edge Change Ratio parameters.
    pub ecr: EcrParams,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            min_cut_distance: 2,
            ecr: EcrParams::default(),
        }
    }
}

/// Outcome of a detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// First frame of every new shot, strictly increasing.
    pub cuts: Vec<Timecode>,
    /// Number of frames read.
    pub frames: u64,
    /// Running timecode of the first frame.
    pub start: Timecode,
    /// Running timecode just past the last frame.
    pub end: Timecode,
}

/// Scene-cut detector.
#[derive(Debug, Clone, Default)]
pub struct SceneCutDetector {
    config: DetectorConfig,
    similarity: EdgeSimilarity,
}

impl SceneCutDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let similarity = EdgeSimilarity::new(config.ecr);
        Self { config, similarity }
    }

    /// Detect cuts and return their timecodes. `base` is the running
    /// timecode of the first frame.
    pub fn run<I, S>(&self, frames: I, base: Timecode, sink: &mut S) -> DetectResult<Vec<Timecode>>
    where
        I: IntoIterator<Item = MediaResult<Frame>>,
        S: TraceSink + ?Sized,
    {
        self.detect(frames, base, sink).map(|detection| detection.cuts)
    }

    /// Like [`run`](Self::run), also reporting how many frames were read.
    pub fn detect<I, S>(&self, frames: I, base: Timecode, sink: &mut S) -> DetectResult<Detection>
    where
        I: IntoIterator<Item = MediaResult<Frame>>,
        S: TraceSink + ?Sized,
    {
        let mut running = base;
        let mut previous: Option<FrameEdges> = None;
        let mut cuts: Vec<Timecode> = Vec::new();
        let mut last_cut_offset: Option<u64> = None;
        let mut offset: u64 = 0;

        for frame in frames {
            let frame = frame?;
            let edges = self.similarity.analyze(&frame);

            if let Some(prev) = previous.as_ref() {
                let score = self.similarity.compare(prev, &edges)?;
                let over = score > self.config.threshold;
                let suppressed = over
                    && last_cut_offset
                        .is_some_and(|last| offset - last < self.config.min_cut_distance);
                let cut = over && !suppressed;

                debug!(
                    timecode = %running,
                    index = frame.index(),
                    score,
                    cut,
                    suppressed,
                    "Compared frames"
                );
                if cut {
                    info!(timecode = %running, index = frame.index(), score, "Scene cut detected");
                    cuts.push(running);
                    last_cut_offset = Some(offset);
                } else if suppressed {
                    debug!(
                        timecode = %running,
                        min_cut_distance = self.config.min_cut_distance,
                        "Cut suppressed: too close to previous cut"
                    );
                }

                sink.record(&TraceRecord {
                    timecode: running,
                    index: frame.index(),
                    score,
                    cut,
                    suppressed,
                })?;
            }

            previous = Some(edges);
            running = running.add_frames(1)?;
            offset += 1;
        }

        if offset == 0 {
            return Err(DetectError::EmptySequence);
        }

        info!(frames = offset, cuts = cuts.len(), "Scene-cut detection finished");
        Ok(Detection {
            cuts,
            frames: offset,
            start: base,
            end: running,
        })
    }
}
