//! Cut list to clip events.
//!
//! Cuts live on the detection timeline, which starts at `record_start`.
//! A cut `k` frames after `record_start` starts a clip whose record-in is
//! that cut and whose source-in is `source_start + k`: record and source
//! advance in lockstep. Each clip ends one frame before the next cut; the
//! last clip ends at the end of the source.

use crate::error::{EdlError, EdlResult};
use scenecut_core::{ScenecutError, Timecode};
use serde::{Serialize, Serializer};
use tracing::debug;

/// One clip event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipRecord {
    /// 1-based event number.
    pub sequence: u32,
    #[serde(serialize_with = "as_text")]
    pub source_in: Timecode,
    #[serde(serialize_with = "as_text")]
    pub source_out: Timecode,
    #[serde(serialize_with = "as_text")]
    pub record_in: Timecode,
    #[serde(serialize_with = "as_text")]
    pub record_out: Timecode,
    pub clip_name: String,
}

fn as_text<S: Serializer>(tc: &Timecode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(tc)
}

/// Builds clip records from a cut list.
#[derive(Debug, Clone)]
pub struct EdlBuilder {
    /// Origin of the detection timeline (usually 00:00:00:00).
    pub record_start: Timecode,
    /// Embedded start timecode of the source.
    pub source_start: Timecode,
    /// `source_start` plus the source frame count.
    pub source_end: Timecode,
    pub clip_name: String,
}

impl EdlBuilder {
    pub fn new(
        record_start: Timecode,
        source_start: Timecode,
        source_end: Timecode,
        clip_name: impl Into<String>,
    ) -> Self {
        Self {
            record_start,
            source_start,
            source_end,
            clip_name: clip_name.into(),
        }
    }

    /// Source length in frames.
    pub fn duration(&self) -> EdlResult<i64> {
        let frames = self.source_end.frames_since(&self.source_start)?;
        if frames < 0 {
            return Err(ScenecutError::Range(format!(
                "source end {} precedes source start {}",
                self.source_end, self.source_start
            ))
            .into());
        }
        Ok(frames)
    }

    /// Produce one record per shot. An empty cut list yields a single record
    /// spanning the whole source.
    pub fn build(&self, cuts: &[Timecode]) -> EdlResult<Vec<ClipRecord>> {
        let duration = self.duration()?;
        // Record and source timelines must share a rate for lockstep offsets.
        self.record_start.try_cmp(&self.source_start)?;
        let offsets = self.cut_offsets(cuts, duration)?;

        let mut records = Vec::with_capacity(offsets.len() + 1);
        let mut clip_start = 0i64;
        for (i, next) in offsets
            .iter()
            .copied()
            .map(Some)
            .chain(std::iter::once(None))
            .enumerate()
        {
            let (source_out, record_out) = match next {
                Some(k) => (
                    self.source_start.add_frames(k - 1)?,
                    self.record_start.add_frames(k - 1)?,
                ),
                None => (self.source_end, self.record_start.add_frames(duration)?),
            };
            records.push(ClipRecord {
                sequence: (i + 1) as u32,
                source_in: self.source_start.add_frames(clip_start)?,
                source_out,
                record_in: self.record_start.add_frames(clip_start)?,
                record_out,
                clip_name: self.clip_name.clone(),
            });
            if let Some(k) = next {
                clip_start = k;
            }
        }

        debug!(cuts = cuts.len(), clips = records.len(), "Built clip records");
        Ok(records)
    }

    /// Frame offsets of the cuts from `record_start`, validated.
    fn cut_offsets(&self, cuts: &[Timecode], duration: i64) -> EdlResult<Vec<i64>> {
        let mut offsets = Vec::with_capacity(cuts.len());
        let mut previous = 0i64;
        for cut in cuts {
            let k = cut.frames_since(&self.record_start)?;
            if k <= 0 {
                return Err(range(format!(
                    "cut {cut} is not after the record start {}",
                    self.record_start
                )));
            }
            if k >= duration {
                return Err(range(format!("cut {cut} is not before the end of the source")));
            }
            if k <= previous {
                return Err(range(format!("cut {cut} is out of order or duplicated")));
            }
            offsets.push(k);
            previous = k;
        }
        Ok(offsets)
    }
}

fn range(message: String) -> EdlError {
    ScenecutError::Range(message).into()
}
