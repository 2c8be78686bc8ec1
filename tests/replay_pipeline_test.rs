//! End-to-end runs of the frame loop over recorded landmark streams.

mod common;

use std::{
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use common::{Effect, HandPose, RecordingSink, assert_close, failed_record, no_hand_record};
use handmouse::{
    controller::{GestureController, Presence},
    error::{Error, Result},
    gesture::ClickButton,
    input::PointerSink,
    pipeline::{RunOptions, recognizer::replay, run_loop},
};

fn write_replay(records: &[replay::ReplayRecord]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# synthetic recording").unwrap();
    for record in records {
        writeln!(file, "{}", serde_json::to_string(record).unwrap()).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn replays_motion_and_clicks_from_file() {
    let file = write_replay(&[
        HandPose::at(100.0, 300.0).record(),
        HandPose::at(110.0, 300.0).record(),
        HandPose::at(110.0, 300.0).pinch_left(4.0).record(),
        no_hand_record(),
        HandPose::at(700.0, 20.0).record(),
    ]);

    let (mut source, mut detector) = replay::open(file.path()).unwrap();
    let mut sink = RecordingSink::default();
    let controller = GestureController::default();
    let stop = AtomicBool::new(false);
    let mut presences = Vec::new();

    let stats = run_loop(
        &mut source,
        &mut detector,
        &mut sink,
        &controller,
        &stop,
        RunOptions::default(),
        |_frame, report| presences.push(report.presence),
    )
    .unwrap();

    assert_eq!(stats.frames, 5);
    assert_eq!(stats.tracked_frames, 4);
    assert_eq!(
        presences,
        vec![
            Presence::Tracked,
            Presence::Tracked,
            Presence::Tracked,
            Presence::Absent,
            Presence::Tracked
        ]
    );

    // Default sensitivity 8 and smoothing 0.1: frame 2 moves (110 - 100) * 0.1 * 8.
    let moves = sink.moves();
    assert_eq!(moves.len(), 2);
    assert_close(moves[0].0, 8.0);
    assert_close(moves[0].1, 0.0);
    assert_eq!(sink.clicks(), vec![ClickButton::Left]);
    assert_eq!(stats.moves, 2);
    assert_eq!(stats.clicks, 1);
    // Nothing after re-acquisition: the last effect is frame 3's click.
    assert_eq!(sink.effects.last(), Some(&Effect::Click(ClickButton::Left)));
}

#[test]
fn detector_failures_and_missing_points_do_not_stop_the_loop() {
    let mut partial = HandPose::at(200.0, 200.0).record();
    if let Some(points) = partial.landmarks.as_mut() {
        points[8] = None;
    }

    let (mut source, mut detector) = replay::from_records(vec![
        HandPose::at(100.0, 100.0).record(),
        failed_record("inference timed out"),
        HandPose::at(300.0, 300.0).record(),
        partial,
        HandPose::at(320.0, 300.0).record(),
        HandPose::at(330.0, 300.0).record(),
    ]);
    let mut sink = RecordingSink::default();
    let stop = AtomicBool::new(false);
    let mut presences = Vec::new();

    let stats = run_loop(
        &mut source,
        &mut detector,
        &mut sink,
        &GestureController::default(),
        &stop,
        RunOptions::default(),
        |_frame, report| presences.push(report.presence),
    )
    .unwrap();

    assert_eq!(stats.frames, 6);
    assert_eq!(stats.detector_failures, 1);
    assert_eq!(presences[1], Presence::DetectorUnavailable);
    assert!(matches!(presences[3], Presence::MissingLandmark(_)));
    // Every interruption restarts tracking, so only the final frame can move.
    assert_eq!(sink.moves().len(), 1);
}

struct BrokenSink {
    attempts: usize,
}

impl PointerSink for BrokenSink {
    fn move_relative(&mut self, _dx: f32, _dy: f32) -> Result<()> {
        self.attempts += 1;
        Err(Error::SinkFailure("no display".to_string()))
    }

    fn click(&mut self, _button: ClickButton) -> Result<()> {
        self.attempts += 1;
        Err(Error::SinkFailure("no display".to_string()))
    }
}

#[test]
fn sink_failures_are_counted_not_retried() {
    let (mut source, mut detector) = replay::from_records(vec![
        HandPose::at(100.0, 100.0).pinch_left(3.0).record(),
        HandPose::at(100.0, 100.0).pinch_left(3.0).record(),
        HandPose::at(100.0, 100.0).pinch_left(3.0).record(),
    ]);
    let mut sink = BrokenSink { attempts: 0 };
    let stop = AtomicBool::new(false);

    let stats = run_loop(
        &mut source,
        &mut detector,
        &mut sink,
        &GestureController::default(),
        &stop,
        RunOptions::default(),
        |_, _| {},
    )
    .unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(stats.clicks, 0);
    assert_eq!(stats.sink_failures as usize, sink.attempts);
    // Three left clicks and, with the pinch steady, two zero-length moves.
    assert_eq!(sink.attempts, 5);
}

#[test]
fn stop_flag_and_frame_limit_end_the_run_between_frames() {
    let records: Vec<_> = (0..10).map(|i| HandPose::at(100.0 + i as f32, 100.0).record()).collect();

    let (mut source, mut detector) = replay::from_records(records.clone());
    let stop = AtomicBool::new(false);
    let stats = run_loop(
        &mut source,
        &mut detector,
        &mut RecordingSink::default(),
        &GestureController::default(),
        &stop,
        RunOptions { max_frames: Some(4) },
        |_, _| {},
    )
    .unwrap();
    assert_eq!(stats.frames, 4);

    let (mut source, mut detector) = replay::from_records(records);
    let stop = AtomicBool::new(false);
    let stats = run_loop(
        &mut source,
        &mut detector,
        &mut RecordingSink::default(),
        &GestureController::default(),
        &stop,
        RunOptions::default(),
        |_, report| {
            if report.motion.is_some() {
                stop.store(true, Ordering::Relaxed);
            }
        },
    )
    .unwrap();
    assert_eq!(stats.frames, 2);
}

#[test]
fn malformed_replay_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{\"width\": 640, \"height\": 480, \"landmarks\": [[0.1]]}}").unwrap();
    file.flush().unwrap();
    assert!(replay::open(file.path()).is_err());
}

#[test]
fn bundled_demo_recording_runs_with_bundled_config() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let config = handmouse::config::Config::from_file(root.join("handmouse.yaml")).unwrap();
    let (mut source, mut detector) = replay::open(&root.join("drift_and_click.jsonl")).unwrap();
    let mut sink = RecordingSink::default();
    let stop = AtomicBool::new(false);

    let stats = run_loop(
        &mut source,
        &mut detector,
        &mut sink,
        &GestureController::from_config(&config),
        &stop,
        RunOptions::default(),
        |_, _| {},
    )
    .unwrap();

    assert_eq!(stats.frames, 11);
    assert_eq!(stats.tracked_frames, 10);
    assert_eq!(stats.moves, 8);
    assert_eq!(sink.clicks(), vec![ClickButton::Left]);
    assert!(sink.moves().iter().take(7).all(|(dx, _)| *dx > 0.0));
}
