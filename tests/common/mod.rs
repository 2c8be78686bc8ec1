//! Shared builders for integration tests.

#![allow(dead_code)]

use handmouse::{
    error::Result,
    gesture::ClickButton,
    hand::{HAND_LANDMARK_COUNT, TrackedPoint},
    input::PointerSink,
    pipeline::recognizer::replay::ReplayRecord,
    types::{FrameSize, Landmark},
};

/// Power-of-two frame: integer pixel positions survive normalization exactly.
pub const SIDE: u32 = 1024;
pub const SIZE: FrameSize = FrameSize::new(SIDE as f32, SIDE as f32);

/// Pixel layout of one synthetic hand.
#[derive(Clone, Copy, Debug)]
pub struct HandPose {
    pub index_tip: (f32, f32),
    /// Thumb distance from the index knuckle, along x.
    pub engagement_gap: f32,
    /// Index tip distance from the thumb, along y. Far apart unless set.
    pub left_pinch_gap: Option<f32>,
    pub middle_pinch_gap: Option<f32>,
}

impl HandPose {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            index_tip: (x, y),
            engagement_gap: 5.0,
            left_pinch_gap: None,
            middle_pinch_gap: None,
        }
    }

    pub fn disengaged(mut self, gap: f32) -> Self {
        self.engagement_gap = gap;
        self
    }

    pub fn pinch_left(mut self, gap: f32) -> Self {
        self.left_pinch_gap = Some(gap);
        self
    }

    pub fn pinch_middle(mut self, gap: f32) -> Self {
        self.middle_pinch_gap = Some(gap);
        self
    }

    /// Pixel position of every one of the 21 landmarks.
    pub fn pixels(&self) -> Vec<(f32, f32)> {
        let knuckle = (800.0, 800.0);
        let thumb = (knuckle.0 + self.engagement_gap, knuckle.1);

        let mut points = vec![(50.0, 50.0); HAND_LANDMARK_COUNT];
        points[TrackedPoint::IndexKnuckle.landmark_index()] = knuckle;
        points[TrackedPoint::ThumbTip.landmark_index()] = thumb;
        points[TrackedPoint::IndexTip.landmark_index()] = match self.left_pinch_gap {
            Some(gap) => (thumb.0, thumb.1 + gap),
            None => self.index_tip,
        };
        points[TrackedPoint::MiddleTip.landmark_index()] = match self.middle_pinch_gap {
            Some(gap) => (thumb.0, thumb.1 - gap),
            None => (300.0, 100.0),
        };
        points[TrackedPoint::RingTip.landmark_index()] = (350.0, 100.0);
        points[TrackedPoint::PinkyTip.landmark_index()] = (400.0, 100.0);
        points
    }

    /// Detector-space landmarks: normalized and, like the raw camera feed, unmirrored.
    pub fn landmarks(&self) -> Vec<Landmark> {
        self.pixels()
            .into_iter()
            .enumerate()
            .map(|(id, (px, py))| Landmark::new(id, 1.0 - px / SIZE.width, py / SIZE.height))
            .collect()
    }

    pub fn record(&self) -> ReplayRecord {
        ReplayRecord {
            width: SIDE,
            height: SIDE,
            landmarks: Some(self.landmarks().into_iter().map(|lm| Some([lm.x, lm.y])).collect()),
            error: None,
        }
    }
}

pub fn no_hand_record() -> ReplayRecord {
    ReplayRecord {
        width: SIDE,
        height: SIDE,
        landmarks: None,
        error: None,
    }
}

pub fn failed_record(reason: &str) -> ReplayRecord {
    ReplayRecord {
        error: Some(reason.to_string()),
        ..no_hand_record()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Move(f32, f32),
    Click(ClickButton),
}

/// Sink that remembers every effect it was asked to apply.
#[derive(Default)]
pub struct RecordingSink {
    pub effects: Vec<Effect>,
}

impl RecordingSink {
    pub fn moves(&self) -> Vec<(f32, f32)> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Move(dx, dy) => Some((*dx, *dy)),
                Effect::Click(_) => None,
            })
            .collect()
    }

    pub fn clicks(&self) -> Vec<ClickButton> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Click(button) => Some(*button),
                Effect::Move(..) => None,
            })
            .collect()
    }
}

impl PointerSink for RecordingSink {
    fn move_relative(&mut self, dx: f32, dy: f32) -> Result<()> {
        self.effects.push(Effect::Move(dx, dy));
        Ok(())
    }

    fn click(&mut self, button: ClickButton) -> Result<()> {
        self.effects.push(Effect::Click(button));
        Ok(())
    }
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}
