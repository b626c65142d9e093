//! Integration tests for the detection pipeline.
//!
//! Exercises scenecut-media (sequence reading, prefetch), scenecut-detect
//! and scenecut-edl together on synthetic image sequences.

use image::{Rgb, RgbImage};
use scenecut_core::{FrameRate, Timecode};
use scenecut_detect::{DetectError, DetectorConfig, EcrParams, SceneCutDetector, TraceRecord};
use scenecut_edl::{EdlBuilder, EditDecisionList};
use scenecut_media::{
    CancelToken, FrameSequenceReader, MediaError, MediaResult, PollPolicy, Prefetch,
    SequencePattern,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Helpers ────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Shot {
    A,
    B,
}

/// 64×64 black frame with a white square; shots differ in square position.
fn write_shot(pattern: &SequencePattern, index: u32, shot: Shot) {
    let (x0, y0) = match shot {
        Shot::A => (4, 4),
        Shot::B => (40, 40),
    };
    let image = RgbImage::from_fn(64, 64, |x, y| {
        if (x0..x0 + 16).contains(&x) && (y0..y0 + 16).contains(&y) {
            Rgb([250, 250, 250])
        } else {
            Rgb([5, 5, 5])
        }
    });
    image.save(pattern.path_for(index)).unwrap();
}

fn detector() -> SceneCutDetector {
    SceneCutDetector::new(DetectorConfig {
        threshold: 80.0,
        ecr: EcrParams {
            sigma: 1.0,
            dilation: 5,
            ..Default::default()
        },
        ..Default::default()
    })
}

fn zero() -> Timecode {
    Timecode::zero(FrameRate::FPS_25)
}

// ── Flash frame scenario ───────────────────────────────────────

#[test]
fn flash_frame_yields_one_cut_and_two_abutting_clips() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = SequencePattern::new(dir.path(), "flash").with_extension("png");
    write_shot(&pattern, 1, Shot::A);
    write_shot(&pattern, 2, Shot::B);
    write_shot(&pattern, 3, Shot::A);

    let reader = FrameSequenceReader::complete(pattern, zero());
    let mut trace: Vec<TraceRecord> = Vec::new();
    let detection = detector().detect(reader, zero(), &mut trace).unwrap();

    assert_eq!(detection.frames, 3);
    assert_eq!(detection.cuts, vec![Timecode::parse("00:00:00:01", FrameRate::FPS_25).unwrap()]);
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.iter().filter(|r| r.cut).count(), 1);

    let builder = EdlBuilder::new(zero(), zero(), detection.end, "flash");
    let records = builder.build(&detection.cuts).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].record_out.add_frames(1).unwrap(),
        records[1].record_in
    );
    assert_eq!(records[1].record_in.to_string(), "00:00:00:01");
}

// ── Prefetch and ordering ──────────────────────────────────────

#[test]
fn prefetched_sequence_matches_direct_read() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = SequencePattern::new(dir.path(), "shots").with_extension("png");
    let layout = [Shot::A, Shot::A, Shot::A, Shot::B, Shot::B, Shot::B, Shot::A, Shot::A];
    for (i, shot) in layout.iter().enumerate() {
        write_shot(&pattern, i as u32 + 1, *shot);
    }

    let direct = detector()
        .run(
            FrameSequenceReader::complete(pattern.clone(), zero()),
            zero(),
            &mut Vec::<TraceRecord>::new(),
        )
        .unwrap();

    let cancel = CancelToken::new();
    let reader = FrameSequenceReader::complete(pattern, zero()).with_cancel(cancel.clone());
    let prefetched = detector()
        .run(
            Prefetch::with_cancel(reader, 2, cancel).unwrap(),
            zero(),
            &mut Vec::<TraceRecord>::new(),
        )
        .unwrap();

    assert_eq!(direct, prefetched);
    let offsets: Vec<u64> = direct.iter().map(Timecode::total_frames).collect();
    assert_eq!(offsets, vec![3, 6]);
}

// ── Live producer ──────────────────────────────────────────────

#[test]
fn live_reader_follows_a_slow_producer() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = SequencePattern::new(dir.path(), "live").with_extension("png");
    let finished = Arc::new(AtomicBool::new(false));

    let writer = {
        let pattern = pattern.clone();
        let finished = finished.clone();
        std::thread::spawn(move || {
            let layout = [Shot::A, Shot::A, Shot::B, Shot::B, Shot::B];
            for (i, shot) in layout.iter().enumerate() {
                write_shot(&pattern, i as u32 + 1, *shot);
                std::thread::sleep(Duration::from_millis(15));
            }
            finished.store(true, Ordering::SeqCst);
        })
    };

    let flag = finished.clone();
    let producer = move || -> MediaResult<bool> { Ok(flag.load(Ordering::SeqCst)) };
    let policy = PollPolicy {
        initial_backoff_ms: 2,
        max_backoff_ms: 20,
        liveness_timeout_ms: 5_000,
    };
    let reader = FrameSequenceReader::live(pattern, zero(), Box::new(producer), policy);
    let mut trace: Vec<TraceRecord> = Vec::new();
    let detection = detector().detect(reader, zero(), &mut trace).unwrap();
    writer.join().unwrap();

    assert_eq!(detection.frames, 5);
    assert_eq!(detection.cuts.len(), 1);
    assert_eq!(detection.cuts[0].to_string(), "00:00:00:02");
}

#[test]
fn stalled_producer_aborts_detection() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = SequencePattern::new(dir.path(), "stall").with_extension("png");
    write_shot(&pattern, 1, Shot::A);
    write_shot(&pattern, 2, Shot::A);

    let producer = || -> MediaResult<bool> { Ok(false) };
    let policy = PollPolicy {
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        liveness_timeout_ms: 50,
    };
    let reader = FrameSequenceReader::live(pattern, zero(), Box::new(producer), policy);
    let result = detector().run(reader, zero(), &mut Vec::<TraceRecord>::new());

    assert!(matches!(
        result,
        Err(DetectError::Media(MediaError::ExtractionTimeout { index: 2, .. }))
    ));
}

// ── Trace and EDL rendering ────────────────────────────────────

#[test]
fn trace_lines_and_edl_document_agree() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = SequencePattern::new(dir.path(), "doc").with_extension("png");
    for (i, shot) in [Shot::A, Shot::B, Shot::B, Shot::B].iter().enumerate() {
        write_shot(&pattern, i as u32 + 1, *shot);
    }

    let start = Timecode::parse("01:00:00:00", FrameRate::FPS_25).unwrap();
    let reader = FrameSequenceReader::complete(pattern, start);
    let mut trace: Vec<TraceRecord> = Vec::new();
    let detection = detector().detect(reader, zero(), &mut trace).unwrap();

    let lines: Vec<String> = trace.iter().map(ToString::to_string).collect();
    assert!(lines[0].starts_with("00:00:00:01,2,"));
    assert!(lines[0].ends_with(",CUT!"));
    assert_eq!(lines[1], "00:00:00:02,3,0");

    let source_end = start.add_frames(detection.frames as i64).unwrap();
    let builder = EdlBuilder::new(detection.start, start, source_end, "doc");
    let edl = EditDecisionList::new("doc", builder.build(&detection.cuts).unwrap());
    let expected = "\
TITLE:  doc
FCM: NON-DROP FRAME

001        AX AA/V C        01:00:00:00 01:00:00:00 00:00:00:00 00:00:00:00
* FROM CLIP NAME:  doc

002        AX AA/V C        01:00:00:01 01:00:00:04 00:00:00:01 00:00:00:04
* FROM CLIP NAME:  doc

";
    assert_eq!(edl.render(), expected);
}
