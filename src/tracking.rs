use crate::{
    gesture::HeldGestures,
    hand::{HandFrame, TrackedPoint},
    types::PixelPoint,
};

/// State carried between frames. The previous position and the smoothing
/// accumulator live in one `Option` so they are always set or cleared together.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackingState {
    continuity: Option<Continuity>,
    held: HeldGestures,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Continuity {
    previous: PixelPoint,
    smoothed: PixelPoint,
}

impl TrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand lost: forget the trajectory and any held gestures.
    pub fn reset(self) -> Self {
        if self.continuity.is_some() {
            log::debug!("hand lost, tracking state cleared");
        }
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.continuity.is_some()
    }

    pub fn previous(&self) -> Option<PixelPoint> {
        self.continuity.map(|c| c.previous)
    }

    pub fn smoothed(&self) -> Option<PixelPoint> {
        self.continuity.map(|c| c.smoothed)
    }

    pub fn held(&self) -> HeldGestures {
        self.held
    }

    pub(crate) fn with_held(self, held: HeldGestures) -> Self {
        Self { held, ..self }
    }
}

/// Exponential moving average over the tracked fingertip.
#[derive(Clone, Copy, Debug)]
pub struct MotionSmoother {
    alpha: f32,
}

impl MotionSmoother {
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn smooth(&self, accumulator: Option<PixelPoint>, raw: PixelPoint) -> PixelPoint {
        match accumulator {
            None => raw,
            Some(s) => PixelPoint::new(
                s.x + (raw.x - s.x) * self.alpha,
                s.y + (raw.y - s.y) * self.alpha,
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionOutcome {
    pub engaged: bool,
    pub smoothed: PixelPoint,
    pub motion: Option<Motion>,
}

/// Turns consecutive smoothed positions into relative pointer moves while the
/// thumb rests against the index knuckle.
#[derive(Clone, Copy, Debug)]
pub struct MotionTranslator {
    smoother: MotionSmoother,
    sensitivity: f32,
    engagement_threshold: f32,
}

impl MotionTranslator {
    pub fn new(smoother: MotionSmoother, sensitivity: f32, engagement_threshold: f32) -> Self {
        Self {
            smoother,
            sensitivity,
            engagement_threshold,
        }
    }

    pub fn is_engaged(&self, hand: &HandFrame) -> bool {
        hand.distance(TrackedPoint::IndexKnuckle, TrackedPoint::ThumbTip) < self.engagement_threshold
    }

    pub fn displacement(
        &self,
        previous: Option<PixelPoint>,
        current: PixelPoint,
        engaged: bool,
    ) -> Option<Motion> {
        let previous = previous.filter(|_| engaged)?;
        Some(Motion {
            dx: (current.x - previous.x) * self.sensitivity,
            dy: (current.y - previous.y) * self.sensitivity,
        })
    }

    /// Advances the state by one hand-present frame. The previous position is
    /// updated whether or not the gate is open, so displacement always spans
    /// two consecutive frames.
    pub fn track(&self, state: TrackingState, hand: &HandFrame) -> (TrackingState, MotionOutcome) {
        let raw = hand.get(TrackedPoint::IndexTip);
        let smoothed = self.smoother.smooth(state.smoothed(), raw);
        let engaged = self.is_engaged(hand);
        let motion = self.displacement(state.previous(), smoothed, engaged);

        let next = TrackingState {
            continuity: Some(Continuity {
                previous: smoothed,
                smoothed,
            }),
            held: state.held,
        };

        (
            next,
            MotionOutcome {
                engaged,
                smoothed,
                motion,
            },
        )
    }
}
