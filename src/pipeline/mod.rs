#[cfg(feature = "camera-nokhwa")]
pub mod camera;
pub mod recognizer;

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use crossbeam_channel::Receiver;

use crate::{
    controller::{FrameReport, GestureController, HandObservation},
    input::{PointerSink, apply_report},
    tracking::TrackingState,
    types::Frame,
};

pub use recognizer::HandDetector;

pub trait FrameSource {
    /// Blocks until the next frame. `Ok(None)` ends the run.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }
}

/// Frames pushed by a capture thread. Stale frames are skipped so the loop
/// always works on the most recent image.
pub struct ChannelSource {
    frame_rx: Receiver<Frame>,
}

impl ChannelSource {
    pub fn new(frame_rx: Receiver<Frame>) -> Self {
        Self { frame_rx }
    }
}

impl FrameSource for ChannelSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(recv_latest_frame(&self.frame_rx))
    }
}

fn recv_latest_frame(frame_rx: &Receiver<Frame>) -> Option<Frame> {
    let mut frame = frame_rx.recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub tracked_frames: u64,
    pub detector_failures: u64,
    pub moves: u64,
    pub clicks: u64,
    pub sink_failures: u64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    pub max_frames: Option<u64>,
}

/// Single-threaded frame loop: pull, detect, translate, apply. The stop flag is
/// checked between frames only, so a frame is never abandoned half way.
pub fn run_loop<F>(
    source: &mut dyn FrameSource,
    detector: &mut dyn HandDetector,
    sink: &mut dyn PointerSink,
    controller: &GestureController,
    stop: &AtomicBool,
    options: RunOptions,
    mut on_report: F,
) -> Result<RunStats>
where
    F: FnMut(&Frame, &FrameReport),
{
    let mut state = TrackingState::new();
    let mut stats = RunStats::default();

    while !stop.load(Ordering::Relaxed) {
        if options.max_frames.is_some_and(|max| stats.frames >= max) {
            log::info!("frame limit reached");
            break;
        }

        let Some(frame) = source.next_frame()? else {
            log::info!("frame source ended");
            break;
        };

        let detection = detector.detect(&frame);
        let observation = match &detection {
            Ok(Some(landmarks)) => HandObservation::Present(landmarks),
            Ok(None) => HandObservation::Absent,
            Err(err) => {
                log::warn!("hand detection failed: {err:?}");
                stats.detector_failures += 1;
                HandObservation::Unavailable
            }
        };

        let (next, report) = controller.process_frame(state, observation, frame.size());
        state = next;

        let applied = apply_report(sink, &report);
        log::trace!("frame {}: {}", stats.frames, report.label());

        stats.frames += 1;
        if report.hand_present() {
            stats.tracked_frames += 1;
        }
        stats.moves += applied.moves as u64;
        stats.clicks += applied.clicks as u64;
        stats.sink_failures += applied.failures as u64;

        on_report(&frame, &report);
    }

    Ok(stats)
}
