use std::{
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow};
use image::{ImageBuffer, Rgb, imageops};
use ndarray::Array4;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use rayon::prelude::*;

use super::HandDetector;
use crate::{
    hand::HAND_LANDMARK_COUNT,
    types::{Frame, Landmark},
};

pub const INPUT_SIZE: u32 = 224;

// A hand seen within this window keeps the crop; older tracks fall back to the frame centre.
const TRACK_MAX_AGE: Duration = Duration::from_millis(450);
const ROI_EXPANSION: f32 = 1.8;
const MIN_ROI_SIDE: f32 = 80.0;

/// Runs the MediaPipe handpose estimator on a square crop of the frame.
pub struct OrtHandDetector {
    handpose: Session,
    min_confidence: f32,
    tracker: HandTracker,
}

impl OrtHandDetector {
    pub fn new(model_path: &Path, min_confidence: f32) -> Result<Self> {
        let handpose = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load ORT session from {}", model_path.display()))?;

        log::info!("handpose ORT backend ready using {}", model_path.display());

        Ok(Self {
            handpose,
            min_confidence,
            tracker: HandTracker::new(),
        })
    }
}

impl HandDetector for OrtHandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<Vec<Landmark>>> {
        if frame.width == 0 || frame.height == 0 || frame.rgb.is_empty() {
            return Err(anyhow!("frame has no pixel data"));
        }

        let roi = self
            .tracker
            .estimate_roi(frame)
            .unwrap_or_else(|| SquareRoi::centered(frame.width, frame.height));

        let input = prepare_input(frame, &roi)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .handpose
            .run(ort::inputs![tensor])
            .context("failed to run ORT session")?;

        if outputs.len() < 2 {
            return Err(anyhow!("model returned {} outputs, expected at least 2", outputs.len()));
        }

        let coords = outputs[0].try_extract_array::<f32>()?;
        let flattened: Vec<f32> = coords.iter().copied().collect();
        let confidence = outputs[1]
            .try_extract_array::<f32>()
            .ok()
            .and_then(|arr| arr.iter().next().copied())
            .unwrap_or(0.0);

        if confidence < self.min_confidence {
            self.tracker.clear();
            return Ok(None);
        }

        let landmarks = decode_landmarks(&flattened, &roi, frame.width, frame.height)?;
        self.tracker.update(&landmarks, frame);
        Ok(Some(landmarks))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SquareRoi {
    x: u32,
    y: u32,
    side: u32,
}

impl SquareRoi {
    fn centered(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            x: (width - side) / 2,
            y: (height - side) / 2,
            side,
        }
    }

    /// Square of `side` pixels around `center`, shifted and shrunk to stay inside the frame.
    fn around(center: (f32, f32), side: f32, width: u32, height: u32) -> Self {
        let side = (side.round() as u32).clamp(1, width.min(height));
        let half = side as f32 / 2.0;
        let max_x = (width - side) as f32;
        let max_y = (height - side) as f32;
        Self {
            x: (center.0 - half).clamp(0.0, max_x) as u32,
            y: (center.1 - half).clamp(0.0, max_y) as u32,
            side,
        }
    }
}

fn prepare_input(frame: &Frame, roi: &SquareRoi) -> Result<Array4<f32>> {
    let view = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(frame.width, frame.height, &frame.rgb[..])
        .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", frame.width, frame.height))?;
    let crop = imageops::crop_imm(&view, roi.x, roi.y, roi.side, roi.side).to_image();
    let resized = imageops::resize(&crop, INPUT_SIZE, INPUT_SIZE, imageops::FilterType::Triangle);

    let side = INPUT_SIZE as usize;
    let mut input = Array4::<f32>::zeros((1, side, side, 3));
    let dst = input
        .as_slice_mut()
        .ok_or_else(|| anyhow!("input tensor is not contiguous"))?;
    dst.par_iter_mut()
        .zip(resized.as_raw().par_iter())
        .for_each(|(dst, &src)| *dst = f32::from(src) / 255.0);

    Ok(input)
}

/// Model coordinates are in input pixels; map them back through the crop and
/// normalize to the full frame.
fn decode_landmarks(flat: &[f32], roi: &SquareRoi, width: u32, height: u32) -> Result<Vec<Landmark>> {
    if flat.len() < HAND_LANDMARK_COUNT * 3 {
        return Err(anyhow!(
            "expected {} landmark values, got {}",
            HAND_LANDMARK_COUNT * 3,
            flat.len()
        ));
    }

    let scale = roi.side as f32 / INPUT_SIZE as f32;
    Ok(flat
        .chunks_exact(3)
        .take(HAND_LANDMARK_COUNT)
        .enumerate()
        .map(|(id, point)| {
            let px = roi.x as f32 + point[0] * scale;
            let py = roi.y as f32 + point[1] * scale;
            Landmark::new(id, px / width as f32, py / height as f32)
        })
        .collect())
}

struct TrackedHand {
    points: Vec<(f32, f32)>,
    last_seen: Instant,
}

struct HandTracker {
    last: Option<TrackedHand>,
}

impl HandTracker {
    fn new() -> Self {
        Self { last: None }
    }

    fn clear(&mut self) {
        self.last = None;
    }

    fn update(&mut self, landmarks: &[Landmark], frame: &Frame) {
        let (w, h) = (frame.width as f32, frame.height as f32);
        self.last = Some(TrackedHand {
            points: landmarks.iter().map(|lm| (lm.x * w, lm.y * h)).collect(),
            last_seen: frame.timestamp,
        });
    }

    fn estimate_roi(&self, frame: &Frame) -> Option<SquareRoi> {
        let tracked = self.last.as_ref()?;
        if frame.timestamp.duration_since(tracked.last_seen) > TRACK_MAX_AGE || tracked.points.len() < 3 {
            return None;
        }

        let (min_x, max_x, min_y, max_y) = tracked
            .points
            .iter()
            .fold((f32::MAX, f32::MIN, f32::MAX, f32::MIN), |acc, (x, y)| {
                (acc.0.min(*x), acc.1.max(*x), acc.2.min(*y), acc.3.max(*y))
            });

        if !min_x.is_finite() || !max_x.is_finite() || !min_y.is_finite() || !max_y.is_finite() {
            return None;
        }

        let span = (max_x - min_x).max(max_y - min_y);
        let side = (span * ROI_EXPANSION).max(MIN_ROI_SIDE);
        let center = ((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);
        Some(SquareRoi::around(center, side, frame.width, frame.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_roi_is_largest_square() {
        assert_eq!(SquareRoi::centered(640, 480), SquareRoi { x: 80, y: 0, side: 480 });
        assert_eq!(SquareRoi::centered(480, 640), SquareRoi { x: 0, y: 80, side: 480 });
    }

    #[test]
    fn roi_stays_inside_frame() {
        let roi = SquareRoi::around((620.0, 10.0), 200.0, 640, 480);
        assert_eq!(roi, SquareRoi { x: 440, y: 0, side: 200 });
        let huge = SquareRoi::around((320.0, 240.0), 5000.0, 640, 480);
        assert_eq!(huge.side, 480);
    }

    #[test]
    fn decodes_through_crop() {
        let roi = SquareRoi { x: 80, y: 0, side: 448 };
        let mut flat = vec![0.0f32; HAND_LANDMARK_COUNT * 3];
        flat[0] = 112.0;
        flat[1] = 224.0;
        let landmarks = decode_landmarks(&flat, &roi, 640, 480).unwrap();
        assert_eq!(landmarks.len(), HAND_LANDMARK_COUNT);
        assert!((landmarks[0].x - (80.0 + 224.0) / 640.0).abs() < 1e-6);
        assert!((landmarks[0].y - 448.0 / 480.0).abs() < 1e-6);
        assert!(decode_landmarks(&flat[..10], &roi, 640, 480).is_err());
    }

    #[test]
    fn stale_track_is_ignored() {
        let mut tracker = HandTracker::new();
        let mut frame = Frame::blank(640, 480);
        let landmarks: Vec<Landmark> = (0..HAND_LANDMARK_COUNT)
            .map(|id| Landmark::new(id, 0.5 + id as f32 * 0.005, 0.5))
            .collect();
        tracker.update(&landmarks, &frame);
        assert!(tracker.estimate_roi(&frame).is_some());

        frame.timestamp += TRACK_MAX_AGE + Duration::from_millis(1);
        assert!(tracker.estimate_roi(&frame).is_none());
    }
}
