//! Integration tests for EDL generation from probed sources.

use scenecut_core::{FrameRate, Timecode};
use scenecut_edl::{EdlBuilder, EdlError, EditDecisionList};
use scenecut_media::SourceInfo;
use std::path::Path;

const BANNER: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'reel.mov':
  Metadata:
    timecode        : 10:00:00:00
  Duration: 00:00:04.00, start: 0.000000, bitrate: 1200 kb/s
    Stream #0:0(und): Video: prores (HQ) (apch / 0x68637061), yuv422p10le, 1280x720, 24 fps, 24 tbr, 24 tbn (default)
";

fn probed() -> SourceInfo {
    SourceInfo::from_ffprobe_banner(Path::new("reel.mov"), BANNER).unwrap()
}

fn tc(text: &str, rate: FrameRate) -> Timecode {
    Timecode::parse(text, rate).unwrap()
}

#[test]
fn probed_source_drives_edl_bounds() {
    let info = probed();
    assert_eq!(info.total_frames, 96);
    let rate = info.frame_rate;

    let builder = EdlBuilder::new(
        Timecode::zero(rate),
        info.start_timecode,
        info.end_timecode().unwrap(),
        "reel",
    );
    let cuts = [tc("00:00:01:00", rate), tc("00:00:02:12", rate)];
    let records = builder.build(&cuts).unwrap();

    let rows: Vec<(String, String, String, String)> = records
        .iter()
        .map(|r| {
            (
                r.source_in.to_string(),
                r.source_out.to_string(),
                r.record_in.to_string(),
                r.record_out.to_string(),
            )
        })
        .collect();
    let expected = [
        ("10:00:00:00", "10:00:00:23", "00:00:00:00", "00:00:00:23"),
        ("10:00:01:00", "10:00:02:11", "00:00:01:00", "00:00:02:11"),
        ("10:00:02:12", "10:00:04:00", "00:00:02:12", "00:00:04:00"),
    ];
    assert_eq!(rows.len(), expected.len());
    for (row, want) in rows.iter().zip(expected) {
        assert_eq!((row.0.as_str(), row.1.as_str(), row.2.as_str(), row.3.as_str()), want);
    }
}

#[test]
fn no_cuts_yields_single_clip_document() {
    let rate = FrameRate::FPS_25;
    let builder = EdlBuilder::new(
        Timecode::zero(rate),
        Timecode::zero(rate),
        tc("00:00:10:00", rate),
        "static",
    );
    let edl = EditDecisionList::new("static", builder.build(&[]).unwrap());
    assert_eq!(
        edl.render(),
        "TITLE:  static\nFCM: NON-DROP FRAME\n\n\
         001        AX AA/V C        00:00:00:00 00:00:10:00 00:00:00:00 00:00:10:00\n\
         * FROM CLIP NAME:  static\n\n"
    );
}

#[test]
fn json_export_matches_rendered_records() {
    let info = probed();
    let rate = info.frame_rate;
    let builder = EdlBuilder::new(
        Timecode::zero(rate),
        info.start_timecode,
        info.end_timecode().unwrap(),
        "reel",
    );
    let edl = EditDecisionList::new("reel", builder.build(&[tc("00:00:02:00", rate)]).unwrap());

    let dir = tempfile::tempdir().unwrap();
    let edl_path = dir.path().join("reel.edl");
    let json_path = dir.path().join("reel.json");
    edl.write_to(&edl_path).unwrap();
    edl.write_json_to(&json_path).unwrap();

    let rendered = std::fs::read_to_string(&edl_path).unwrap();
    assert_eq!(rendered, edl.render());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let records = value["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["source_in"], "10:00:02:00");
    assert_eq!(records[1]["record_out"], "00:00:04:00");
    assert_eq!(records[0]["clip_name"], "reel");
}

#[test]
fn cut_past_probed_end_is_rejected() {
    let info = probed();
    let rate = info.frame_rate;
    let builder = EdlBuilder::new(
        Timecode::zero(rate),
        info.start_timecode,
        info.end_timecode().unwrap(),
        "reel",
    );
    let result = builder.build(&[tc("00:00:05:00", rate)]);
    assert!(matches!(result, Err(EdlError::Core(_))));
}
