use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{FrameSize, Landmark, PixelPoint},
};

pub const HAND_LANDMARK_COUNT: usize = 21;

/// The landmark roles the controller reads every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedPoint {
    ThumbTip,
    IndexKnuckle,
    IndexTip,
    MiddleTip,
    RingTip,
    PinkyTip,
}

impl TrackedPoint {
    pub const ALL: [TrackedPoint; 6] = [
        TrackedPoint::ThumbTip,
        TrackedPoint::IndexKnuckle,
        TrackedPoint::IndexTip,
        TrackedPoint::MiddleTip,
        TrackedPoint::RingTip,
        TrackedPoint::PinkyTip,
    ];

    /// Index of this role in the detector's 21-point topology.
    pub const fn landmark_index(self) -> usize {
        match self {
            TrackedPoint::ThumbTip => 4,
            TrackedPoint::IndexKnuckle => 5,
            TrackedPoint::IndexTip => 8,
            TrackedPoint::MiddleTip => 12,
            TrackedPoint::RingTip => 16,
            TrackedPoint::PinkyTip => 20,
        }
    }

    pub fn from_landmark_index(index: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|point| point.landmark_index() == index)
    }

    const fn slot(self) -> usize {
        match self {
            TrackedPoint::ThumbTip => 0,
            TrackedPoint::IndexKnuckle => 1,
            TrackedPoint::IndexTip => 2,
            TrackedPoint::MiddleTip => 3,
            TrackedPoint::RingTip => 4,
            TrackedPoint::PinkyTip => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrackedPoint::ThumbTip => "thumb tip",
            TrackedPoint::IndexKnuckle => "index knuckle",
            TrackedPoint::IndexTip => "index tip",
            TrackedPoint::MiddleTip => "middle tip",
            TrackedPoint::RingTip => "ring tip",
            TrackedPoint::PinkyTip => "pinky tip",
        }
    }
}

/// Maps a normalized landmark position to pixels. The camera feed is not
/// mirrored, so x is flipped to make the hand move the way the user sees it.
pub fn to_pixel(x: f32, y: f32, size: FrameSize) -> PixelPoint {
    PixelPoint::new((1.0 - x) * size.width, y * size.height)
}

/// Pixel positions of every tracked role for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandFrame {
    points: [PixelPoint; 6],
}

impl HandFrame {
    /// Resolves the tracked roles in a single pass. Landmarks outside the
    /// tracked set are ignored; a missing role fails the whole frame.
    pub fn resolve(landmarks: &[Landmark], size: FrameSize) -> Result<Self> {
        let mut slots: [Option<PixelPoint>; 6] = [None; 6];
        for landmark in landmarks {
            if let Some(point) = TrackedPoint::from_landmark_index(landmark.id) {
                slots[point.slot()] = Some(to_pixel(landmark.x, landmark.y, size));
            }
        }

        let mut points = [PixelPoint::default(); 6];
        for point in TrackedPoint::ALL {
            points[point.slot()] = slots[point.slot()].ok_or(Error::MissingLandmark(point))?;
        }

        Ok(Self { points })
    }

    pub fn get(&self, point: TrackedPoint) -> PixelPoint {
        self.points[point.slot()]
    }

    pub fn distance(&self, a: TrackedPoint, b: TrackedPoint) -> f32 {
        self.get(a).distance(self.get(b))
    }
}
