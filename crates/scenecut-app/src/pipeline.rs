//! Detection runs: frames in, trace and EDL out.

use anyhow::{Context, Result};
use scenecut_core::{Frame, FrameRate, Timecode};
use scenecut_detect::{Detection, SceneCutDetector, TraceWriter};
use scenecut_edl::{EdlBuilder, EditDecisionList};
use scenecut_media::{
    CancelToken, ExtractionMode, FrameExtractor, FrameSequenceReader, MediaResult, MediaTools,
    Prefetch, ScratchDir, SequencePattern, SourceInfo,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Files written by one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub trace: PathBuf,
    pub edl: PathBuf,
    pub json: Option<PathBuf>,
    pub frames: u64,
    pub cuts: Vec<Timecode>,
}

/// Where the frames come from and how the source is laid out in time.
struct Source<'a> {
    name: &'a str,
    /// Source start timecode (embedded in the media).
    start: Timecode,
    /// Probed frame count, when known.
    expected_frames: Option<u64>,
}

/// Probe, extract and analyze a video file.
pub fn detect_video(config: &AppConfig, video: &Path, output: &Path, json: bool) -> Result<RunOutput> {
    let tools = MediaTools::resolve(&config.tools)?;
    let info = SourceInfo::probe(&tools.ffprobe, video)
        .with_context(|| format!("Failed to probe {}", video.display()))?;
    let name = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".into());

    let scratch = ScratchDir::create(config.scratch_root.as_deref())?;
    let extractor = FrameExtractor::new(&tools.ffmpeg, config.extract.clone());
    let pattern = extractor.pattern_for(scratch.path(), &name);
    let handle = extractor.spawn(video, &pattern)?;

    let cancel = CancelToken::new();
    let reader = match config.extract.mode {
        ExtractionMode::Blocking => {
            handle.wait()?;
            FrameSequenceReader::complete(pattern, info.start_timecode)
        }
        ExtractionMode::Pipelined => FrameSequenceReader::live(
            pattern,
            info.start_timecode,
            Box::new(handle),
            config.poll,
        ),
    }
    .with_cancel(cancel.clone());

    let source = Source {
        name: &name,
        start: info.start_timecode,
        expected_frames: Some(info.total_frames),
    };
    let result = analyze(config, reader, cancel, &source, output, json);

    // Frames are only needed until detection finishes.
    if let Err(e) = scratch.close() {
        warn!(error = %e, "Scratch directory cleanup failed");
    }
    result
}

/// Analyze an image sequence that is already on disk.
pub fn scan_sequence(
    config: &AppConfig,
    pattern: SequencePattern,
    fps: f64,
    start: &str,
    name: &str,
    output: &Path,
    json: bool,
) -> Result<RunOutput> {
    let rate = FrameRate::from_fps_f64(fps)?;
    let start = Timecode::parse(start, rate)
        .with_context(|| format!("Invalid start timecode '{start}'"))?;
    let cancel = CancelToken::new();
    let reader = FrameSequenceReader::complete(pattern, start).with_cancel(cancel.clone());
    let source = Source {
        name,
        start,
        expected_frames: None,
    };
    analyze(config, reader, cancel, &source, output, json)
}

fn analyze(
    config: &AppConfig,
    reader: FrameSequenceReader,
    cancel: CancelToken,
    source: &Source<'_>,
    output: &Path,
    json: bool,
) -> Result<RunOutput> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let frames: Box<dyn Iterator<Item = MediaResult<Frame>>> = if config.prefetch_depth > 0 {
        Box::new(
            Prefetch::with_cancel(reader, config.prefetch_depth, cancel)
                .context("Failed to start frame prefetch")?,
        )
    } else {
        Box::new(reader)
    };

    let trace_path = output.join(format!("{}.txt", source.name));
    let file = File::create(&trace_path)
        .with_context(|| format!("Failed to create {}", trace_path.display()))?;
    let mut trace = TraceWriter::new(BufWriter::new(file));

    // Cuts are counted on a timeline starting at zero; the EDL re-bases them
    // onto the source start.
    let record_start = Timecode::zero(source.start.rate());
    let detector = SceneCutDetector::new(config.detector.clone());
    let detection = detector.detect(frames, record_start, &mut trace)?;
    trace.finish()?;

    let (edl_path, json_path) = write_edl(&detection, source, output, json)?;
    info!(
        frames = detection.frames,
        cuts = detection.cuts.len(),
        edl = %edl_path.display(),
        "Run complete"
    );

    Ok(RunOutput {
        trace: trace_path,
        edl: edl_path,
        json: json_path,
        frames: detection.frames,
        cuts: detection.cuts,
    })
}

fn write_edl(
    detection: &Detection,
    source: &Source<'_>,
    output: &Path,
    json: bool,
) -> Result<(PathBuf, Option<PathBuf>)> {
    if let Some(expected) = source.expected_frames {
        if expected != detection.frames {
            warn!(
                probed = expected,
                read = detection.frames,
                "Frame count differs from probe; using frames read"
            );
        }
    }

    let source_end = source.start.add_frames(detection.frames as i64)?;
    let builder = EdlBuilder::new(detection.start, source.start, source_end, source.name);
    let edl = EditDecisionList::new(source.name, builder.build(&detection.cuts)?);

    let edl_path = output.join(format!("{}.edl", source.name));
    edl.write_to(&edl_path)?;

    let json_path = if json {
        let path = output.join(format!("{}.json", source.name));
        edl.write_json_to(&path)?;
        Some(path)
    } else {
        None
    };
    Ok((edl_path, json_path))
}
