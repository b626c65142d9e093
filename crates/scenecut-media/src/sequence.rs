//! Lazy reader over a numbered image sequence on disk.
//!
//! The directory is usually being filled by an external extractor while it
//! is read. The reader only ever yields frames that exist and are complete:
//!
//! - frame N is read once frame N+1 exists, or once the producer finished;
//! - the first missing index ends the sequence only after the producer
//!   finished;
//! - while the producer runs, the reader polls with exponential backoff and
//!   fails with [`MediaError::ExtractionTimeout`] if no frame shows up within
//!   the liveness bound.

use crate::cancel::CancelToken;
use crate::error::{MediaError, MediaResult};
use scenecut_core::{Frame, Timecode};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// File naming of an extracted sequence: `<dir>/<stem>_<index>.<extension>`
/// with the index zero-padded to `digits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePattern {
    pub dir: PathBuf,
    pub stem: String,
    pub digits: usize,
    pub extension: String,
}

impl SequencePattern {
    /// Pattern with the default five digits and `jpg` extension.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            digits: 5,
            extension: "jpg".into(),
        }
    }

    pub fn with_digits(mut self, digits: usize) -> Self {
        self.digits = digits.max(1);
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Path of the frame with the given 1-based index.
    pub fn path_for(&self, index: u32) -> PathBuf {
        self.dir.join(format!(
            "{}_{:0width$}.{}",
            self.stem,
            index,
            self.extension,
            width = self.digits
        ))
    }

    /// printf-style output pattern understood by ffmpeg's image2 muxer.
    pub fn printf_pattern(&self) -> PathBuf {
        self.dir.join(format!(
            "{}_%0{}d.{}",
            self.stem, self.digits, self.extension
        ))
    }
}

/// Polling policy used while the producer is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// First sleep between polls (milliseconds).
    pub initial_backoff_ms: u64,
    /// Backoff cap (milliseconds).
    pub max_backoff_ms: u64,
    /// Maximum time to wait for a single frame (milliseconds).
    pub liveness_timeout_ms: u64,
}

impl PollPolicy {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms.max(1))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms.max(self.initial_backoff_ms).max(1))
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.liveness_timeout_ms)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 10,
            max_backoff_ms: 500,
            liveness_timeout_ms: 30_000,
        }
    }
}

/// Completion state of whatever is writing the sequence.
pub trait ProducerStatus: Send {
    /// `Ok(true)` once the producer has exited successfully and every file
    /// it will ever write is on disk. Producer failures are errors.
    fn is_finished(&mut self) -> MediaResult<bool>;
}

impl<F> ProducerStatus for F
where
    F: FnMut() -> MediaResult<bool> + Send,
{
    fn is_finished(&mut self) -> MediaResult<bool> {
        self()
    }
}

enum Availability {
    Ready,
    End,
    Cancelled,
}

/// Ordered, pull-based producer of decoded frames.
///
/// Finite and not restartable: after the end of the sequence or the first
/// error, the iterator only returns `None`.
pub struct FrameSequenceReader {
    pattern: SequencePattern,
    base: Timecode,
    policy: PollPolicy,
    producer: Option<Box<dyn ProducerStatus>>,
    cancel: Option<CancelToken>,
    next_index: u32,
    done: bool,
}

impl FrameSequenceReader {
    /// Reader over a directory that is already fully written.
    /// Frame 1 is labelled with `base`.
    pub fn complete(pattern: SequencePattern, base: Timecode) -> Self {
        Self {
            pattern,
            base,
            policy: PollPolicy::default(),
            producer: None,
            cancel: None,
            next_index: 1,
            done: false,
        }
    }

    /// Reader that synchronizes with a running producer.
    pub fn live(
        pattern: SequencePattern,
        base: Timecode,
        producer: Box<dyn ProducerStatus>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            pattern,
            base,
            policy,
            producer: Some(producer),
            cancel: None,
            next_index: 1,
            done: false,
        }
    }

    /// Stop reading (quietly ending the sequence) once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn pattern(&self) -> &SequencePattern {
        &self.pattern
    }

    /// Index of the frame the next call to `next()` will produce.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    fn producer_finished(&mut self) -> MediaResult<bool> {
        let finished = match self.producer.as_mut() {
            None => true,
            Some(producer) => producer.is_finished()?,
        };
        if finished && self.producer.take().is_some() {
            debug!(next_index = self.next_index, "Frame producer finished");
        }
        Ok(finished)
    }

    fn wait_for(&mut self, index: u32) -> MediaResult<Availability> {
        let path = self.pattern.path_for(index);
        let started = Instant::now();
        let mut backoff = self.policy.initial_backoff();

        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Ok(Availability::Cancelled);
            }

            // Check completion before presence: once the producer is done,
            // whatever exists on disk is complete.
            if self.producer_finished()? {
                return Ok(if path.is_file() {
                    Availability::Ready
                } else {
                    Availability::End
                });
            }

            if path.is_file() && self.pattern.path_for(index.saturating_add(1)).is_file() {
                return Ok(Availability::Ready);
            }

            let waited = started.elapsed();
            if waited >= self.policy.liveness_timeout() {
                return Err(MediaError::ExtractionTimeout {
                    index,
                    path,
                    waited,
                });
            }

            let remaining = self.policy.liveness_timeout() - waited;
            trace!(index, backoff_ms = backoff.as_millis() as u64, "Waiting for frame");
            std::thread::sleep(backoff.min(remaining));
            backoff = (backoff * 2).min(self.policy.max_backoff());
        }
    }

    fn decode(&self, index: u32, path: &Path) -> MediaResult<Frame> {
        let image = image::open(path)
            .map_err(|source| MediaError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let (width, height) = image.dimensions();
        let timecode = self.base.add_frames(index as i64 - 1)?;
        Ok(Frame::from_rgb8(
            index,
            timecode,
            width,
            height,
            image.into_raw(),
        )?)
    }
}

impl Iterator for FrameSequenceReader {
    type Item = MediaResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let index = self.next_index;
        match self.wait_for(index) {
            Ok(Availability::Ready) => {
                let path = self.pattern.path_for(index);
                let frame = self.decode(index, &path);
                match &frame {
                    Ok(_) => {
                        trace!(index, path = %path.display(), "Decoded frame");
                        self.next_index += 1;
                    }
                    Err(_) => self.done = true,
                }
                Some(frame)
            }
            Ok(Availability::End) => {
                self.done = true;
                if index == 1 {
                    Some(Err(MediaError::EmptySequence {
                        dir: self.pattern.dir.clone(),
                    }))
                } else {
                    debug!(frames = index - 1, "Frame sequence exhausted");
                    None
                }
            }
            Ok(Availability::Cancelled) => {
                debug!(next_index = index, "Frame read cancelled");
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for FrameSequenceReader {}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecut_core::FrameRate;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn write_frame(pattern: &SequencePattern, index: u32, rgb: [u8; 3]) {
        let img = image::RgbImage::from_pixel(8, 6, image::Rgb(rgb));
        img.save(pattern.path_for(index)).unwrap();
    }

    fn png_pattern(dir: &Path) -> SequencePattern {
        SequencePattern::new(dir, "clip").with_extension("png")
    }

    fn zero() -> Timecode {
        Timecode::zero(FrameRate::FPS_25)
    }

    fn fast_policy(timeout_ms: u64) -> PollPolicy {
        PollPolicy {
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            liveness_timeout_ms: timeout_ms,
        }
    }

    #[test]
    fn test_pattern_paths() {
        let pattern = SequencePattern::new("/tmp/x", "movie");
        assert_eq!(pattern.path_for(7), PathBuf::from("/tmp/x/movie_00007.jpg"));
        assert_eq!(
            pattern.printf_pattern(),
            PathBuf::from("/tmp/x/movie_%05d.jpg")
        );
        assert_eq!(pattern.path_for(100_000), PathBuf::from("/tmp/x/movie_100000.jpg"));
        assert_eq!(pattern.with_digits(3).path_for(12), PathBuf::from("/tmp/x/movie_012.jpg"));
    }

    #[test]
    fn test_reads_in_order_with_timecodes() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path());
        for i in 1..=3 {
            write_frame(&pattern, i, [i as u8 * 10, 0, 0]);
        }

        let base = Timecode::parse("00:00:10:00", FrameRate::FPS_25).unwrap();
        let frames: Vec<Frame> = FrameSequenceReader::complete(pattern, base)
            .collect::<MediaResult<_>>()
            .unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].index(), 1);
        assert_eq!(frames[2].index(), 3);
        assert_eq!(frames[2].timecode().to_string(), "00:00:10:02");
        assert_eq!(frames[1].pixel(0, 0), [20, 0, 0]);
        assert_eq!(frames[0].dimensions(), (8, 6));
    }

    #[test]
    fn test_first_missing_index_ends_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path());
        write_frame(&pattern, 1, [0, 0, 0]);
        write_frame(&pattern, 2, [0, 0, 0]);
        write_frame(&pattern, 4, [0, 0, 0]);

        let mut reader = FrameSequenceReader::complete(pattern, zero());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert_eq!(reader.next_index(), 3);
    }

    #[test]
    fn test_index_outgrows_padding() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path()).with_digits(1);
        for i in 1..=12 {
            write_frame(&pattern, i, [i as u8, 0, 0]);
        }
        assert!(dir.path().join("clip_12.png").is_file());

        let frames: Vec<Frame> = FrameSequenceReader::complete(pattern, zero())
            .collect::<MediaResult<_>>()
            .unwrap();
        assert_eq!(frames.len(), 12);
        assert_eq!(frames[9].index(), 10);
        assert_eq!(frames[11].pixel(0, 0), [12, 0, 0]);
        assert_eq!(frames[11].timecode().to_string(), "00:00:00:11");
    }

    #[test]
    fn test_live_reader_keeps_waiting_past_padding() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path()).with_digits(1);
        for i in 1..=12 {
            write_frame(&pattern, i, [0, 0, 0]);
        }

        let producer = Box::new(|| -> MediaResult<bool> { Ok(false) });
        let mut reader = FrameSequenceReader::live(pattern, zero(), producer, fast_policy(50));
        for index in 1..=11 {
            assert_eq!(reader.next().unwrap().unwrap().index(), index);
        }
        // Frame 13 never appears while the producer is still running.
        match reader.next() {
            Some(Err(MediaError::ExtractionTimeout { index, .. })) => assert_eq!(index, 12),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = FrameSequenceReader::complete(png_pattern(dir.path()), zero());
        assert!(matches!(
            reader.next(),
            Some(Err(MediaError::EmptySequence { .. }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_undecodable_frame_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path());
        std::fs::write(pattern.path_for(1), b"not an image").unwrap();
        let mut reader = FrameSequenceReader::complete(pattern, zero());
        assert!(matches!(reader.next(), Some(Err(MediaError::Decode { .. }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_stalled_producer_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path());
        write_frame(&pattern, 1, [0, 0, 0]);
        write_frame(&pattern, 2, [0, 0, 0]);

        let producer = Box::new(|| -> MediaResult<bool> { Ok(false) });
        let mut reader =
            FrameSequenceReader::live(pattern, zero(), producer, fast_policy(50));

        assert!(reader.next().unwrap().is_ok());
        // Frame 2 exists but frame 3 never appears and the producer never finishes.
        match reader.next() {
            Some(Err(MediaError::ExtractionTimeout { index, .. })) => assert_eq!(index, 2),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_waits_for_successor_while_producer_runs() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path());
        write_frame(&pattern, 1, [0, 0, 0]);

        let finished = Arc::new(AtomicBool::new(false));
        let polls = Arc::new(AtomicUsize::new(0));
        let producer = {
            let finished = Arc::clone(&finished);
            let polls = Arc::clone(&polls);
            Box::new(move || -> MediaResult<bool> {
                polls.fetch_add(1, Ordering::SeqCst);
                Ok(finished.load(Ordering::SeqCst))
            })
        };

        let writer = {
            let pattern = pattern.clone();
            let finished = Arc::clone(&finished);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                write_frame(&pattern, 2, [255, 255, 255]);
                finished.store(true, Ordering::SeqCst);
            })
        };

        let frames: Vec<Frame> =
            FrameSequenceReader::live(pattern, zero(), producer, fast_policy(5_000))
                .collect::<MediaResult<_>>()
                .unwrap();
        writer.join().unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].pixel(0, 0), [255, 255, 255]);
        assert!(polls.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn test_cancel_ends_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = png_pattern(dir.path());
        write_frame(&pattern, 1, [0, 0, 0]);
        write_frame(&pattern, 2, [0, 0, 0]);

        let token = CancelToken::new();
        let mut reader = FrameSequenceReader::complete(pattern, zero()).with_cancel(token.clone());
        assert!(reader.next().unwrap().is_ok());
        token.cancel();
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_producer_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let producer = Box::new(|| -> MediaResult<bool> {
            Err(MediaError::ExtractorFailed("exit status 1".into()))
        });
        let mut reader = FrameSequenceReader::live(
            png_pattern(dir.path()),
            zero(),
            producer,
            fast_policy(1_000),
        );
        assert!(matches!(
            reader.next(),
            Some(Err(MediaError::ExtractorFailed(_)))
        ));
        assert!(reader.next().is_none());
    }
}
