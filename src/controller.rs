use crate::{
    config::Config,
    error::Error,
    gesture::{ClickButton, GestureClassifier},
    hand::{HandFrame, TrackedPoint},
    tracking::{Motion, MotionSmoother, MotionTranslator, TrackingState},
    types::{FrameSize, Landmark, PixelPoint},
};

/// What the detector said about one frame.
#[derive(Clone, Copy, Debug)]
pub enum HandObservation<'a> {
    Present(&'a [Landmark]),
    Absent,
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Tracked,
    Absent,
    DetectorUnavailable,
    MissingLandmark(TrackedPoint),
}

/// Everything decided for one frame: the effects to apply and the state an
/// overlay would show.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub presence: Presence,
    pub engaged: bool,
    pub smoothed: Option<PixelPoint>,
    pub motion: Option<Motion>,
    pub clicks: Vec<ClickButton>,
}

impl FrameReport {
    fn without_hand(presence: Presence) -> Self {
        Self {
            presence,
            engaged: false,
            smoothed: None,
            motion: None,
            clicks: Vec::new(),
        }
    }

    pub fn hand_present(&self) -> bool {
        self.presence == Presence::Tracked
    }

    pub fn label(&self) -> String {
        match self.presence {
            Presence::Absent => "No hand".to_string(),
            Presence::DetectorUnavailable => "Detector unavailable".to_string(),
            Presence::MissingLandmark(point) => format!("Lost {}", point.label()),
            Presence::Tracked => {
                let mut parts: Vec<&str> = Vec::new();
                if self.engaged {
                    parts.push("Index finger tracking on");
                }
                parts.extend(self.clicks.iter().map(|b| b.display_name()));
                if parts.is_empty() {
                    "Hand detected".to_string()
                } else {
                    parts.join(" + ")
                }
            }
        }
    }
}

/// Per-frame gesture-to-input translation. Holds only configuration; the
/// caller owns the `TrackingState` and threads it through `process_frame`.
pub struct GestureController {
    translator: MotionTranslator,
    classifier: GestureClassifier,
}

impl GestureController {
    pub fn new(translator: MotionTranslator, classifier: GestureClassifier) -> Self {
        Self {
            translator,
            classifier,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let smoother = MotionSmoother::new(config.motion.smoothing_factor);
        let translator = MotionTranslator::new(
            smoother,
            config.motion.sensitivity,
            config.gestures.engagement_threshold_px,
        );
        let classifier = GestureClassifier::new(
            config.gestures.left,
            config.gestures.right,
            config.gestures.auxiliary,
            config.gestures.click_mode,
        );
        Self::new(translator, classifier)
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn process_frame(
        &self,
        state: TrackingState,
        observation: HandObservation<'_>,
        size: FrameSize,
    ) -> (TrackingState, FrameReport) {
        let landmarks = match observation {
            HandObservation::Present(landmarks) if !landmarks.is_empty() => landmarks,
            HandObservation::Present(_) | HandObservation::Absent => {
                return (state.reset(), FrameReport::without_hand(Presence::Absent));
            }
            HandObservation::Unavailable => {
                return (
                    state.reset(),
                    FrameReport::without_hand(Presence::DetectorUnavailable),
                );
            }
        };

        let hand = match HandFrame::resolve(landmarks, size) {
            Ok(hand) => hand,
            Err(Error::MissingLandmark(point)) => {
                log::debug!("skipping frame: {} not reported", point.label());
                return (
                    state.reset(),
                    FrameReport::without_hand(Presence::MissingLandmark(point)),
                );
            }
            Err(err) => {
                log::debug!("skipping frame: {err}");
                return (state.reset(), FrameReport::without_hand(Presence::Absent));
            }
        };

        let (state, motion) = self.translator.track(state, &hand);
        let gestures = self.classifier.classify(&hand, state.held());
        let state = state.with_held(gestures.pinched);

        let report = FrameReport {
            presence: Presence::Tracked,
            engaged: motion.engaged,
            smoothed: Some(motion.smoothed),
            motion: motion.motion,
            clicks: gestures.clicks,
        };
        (state, report)
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
