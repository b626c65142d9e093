//! Per-comparison detection trace.

use crate::error::DetectResult;
use scenecut_core::Timecode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// One frame comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Running timecode of the current frame.
    pub timecode: Timecode,
    /// 1-based index of the current frame.
    pub index: u32,
    /// ECR score against the previous frame.
    pub score: f64,
    /// A cut was declared at this frame.
    pub cut: bool,
    /// The score crossed the threshold but the cut was too close to the
    /// previous one.
    pub suppressed: bool,
}

/// Renders as `<timecode>,<index>,<score>` with a trailing `,CUT!` on cuts.
impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.timecode, self.index, self.score)?;
        if self.cut {
            f.write_str(",CUT!")?;
        }
        Ok(())
    }
}

/// Destination for trace records.
pub trait TraceSink {
    fn record(&mut self, record: &TraceRecord) -> DetectResult<()>;
}

impl TraceSink for Vec<TraceRecord> {
    fn record(&mut self, record: &TraceRecord) -> DetectResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes one line per record.
pub struct TraceWriter<W: Write> {
    out: W,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> DetectResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn record(&mut self, record: &TraceRecord) -> DetectResult<()> {
        writeln!(self.out, "{record}")?;
        Ok(())
    }
}
