use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Instant,
};

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded};
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    query,
    utils::{
        ApiBackend, CameraIndex, CameraInfo, FrameFormat, RequestedFormat, RequestedFormatType,
    },
};

use crate::types::Frame;

// MJPEG first: several built-in cameras reject YUYV even when it is advertised.
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::MJPEG,
    FrameFormat::NV12,
    FrameFormat::RAWRGB,
    FrameFormat::RAWBGR,
];

fn requested_formats() -> [RequestedFormat<'static>; 3] {
    [
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestFrameRate,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

#[derive(Clone, Debug)]
pub struct CameraDevice {
    pub index: CameraIndex,
    pub label: String,
}

/// Capture thread handle. Dropping it stops the thread.
#[derive(Debug)]
pub struct CameraStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CameraStream {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn available_cameras() -> Result<Vec<CameraDevice>> {
    let cameras = query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|info| CameraDevice {
            index: info.index().clone(),
            label: format_camera_label(&info),
        })
        .collect())
}

fn format_camera_label(info: &CameraInfo) -> String {
    let name = info.human_name();
    let desc = info.description().trim();
    let index = info.index().as_string();
    if desc.is_empty() || desc == "N/A" {
        format!("{name} (#{index})")
    } else {
        format!("{name} ({desc}, #{index})")
    }
}

fn build_camera(index: CameraIndex) -> Result<Camera> {
    let mut last_err = None;

    for requested in requested_formats() {
        match Camera::new(index.clone(), requested) {
            Ok(mut camera) => match camera.open_stream() {
                Ok(()) => return Ok(camera),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("failed to open camera with any supported format")))
}

/// Starts capturing on a background thread. The receiver holds at most one
/// frame; frames arriving while the run loop is busy are dropped.
pub fn start_camera_stream(index: CameraIndex) -> Result<(CameraStream, Receiver<Frame>)> {
    // Fail fast before spawning the capture thread.
    build_camera(index.clone())?;

    let (frame_tx, frame_rx) = bounded(1);
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || capture_loop(index, frame_tx, stop_flag));

    Ok((
        CameraStream {
            stop,
            handle: Some(handle),
        },
        frame_rx,
    ))
}

fn capture_loop(index: CameraIndex, frame_tx: Sender<Frame>, stop_flag: Arc<AtomicBool>) {
    let mut camera = match build_camera(index) {
        Ok(cam) => cam,
        Err(err) => {
            log::error!("failed to open camera: {err:?}");
            return;
        }
    };
    log::info!("camera streaming at {}", camera.camera_format());

    while !stop_flag.load(Ordering::Relaxed) {
        let frame = match camera.frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("camera frame read failed: {err:?}");
                continue;
            }
        };

        let decoded = match frame.decode_image::<RgbFormat>() {
            Ok(img) => img,
            Err(err) => {
                log::warn!("failed to decode camera frame: {err:?}");
                continue;
            }
        };

        let (width, height) = decoded.dimensions();
        let rgb = decoded.into_raw();
        if rgb.is_empty() {
            continue;
        }

        let frame = Frame {
            rgb,
            width,
            height,
            timestamp: Instant::now(),
        };

        if frame_tx.is_full() {
            log::trace!("run loop busy, dropping camera frame");
        }
        if let Err(crossbeam_channel::TrySendError::Disconnected(_)) = frame_tx.try_send(frame) {
            break;
        }
    }

    let _ = camera.stop_stream();
}
