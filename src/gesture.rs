use serde::{Deserialize, Serialize};

use crate::hand::{HandFrame, TrackedPoint};

pub const DEFAULT_PINCH_THRESHOLD_PX: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickButton {
    Left,
    Right,
    Auxiliary,
}

impl ClickButton {
    pub const ALL: [ClickButton; 3] = [ClickButton::Left, ClickButton::Right, ClickButton::Auxiliary];

    pub fn display_name(&self) -> &'static str {
        match self {
            ClickButton::Left => "Left Click",
            ClickButton::Right => "Right Click",
            ClickButton::Auxiliary => "Auxiliary Click",
        }
    }

    const fn slot(self) -> usize {
        match self {
            ClickButton::Left => 0,
            ClickButton::Right => 1,
            ClickButton::Auxiliary => 2,
        }
    }
}

/// `Level` fires on every frame a pinch holds; `Edge` only on the frame it starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    #[default]
    Level,
    Edge,
}

impl std::str::FromStr for ClickMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "level" => Ok(ClickMode::Level),
            "edge" => Ok(ClickMode::Edge),
            other => Err(format!("unknown click mode: {other} (expected level or edge)")),
        }
    }
}

/// Two tracked roles that trigger a click when closer than `threshold_px`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinchBinding {
    pub first: TrackedPoint,
    pub second: TrackedPoint,
    pub threshold_px: f32,
}

impl PinchBinding {
    pub const fn new(first: TrackedPoint, second: TrackedPoint, threshold_px: f32) -> Self {
        Self {
            first,
            second,
            threshold_px,
        }
    }

    pub fn is_pinched(&self, hand: &HandFrame) -> bool {
        hand.distance(self.first, self.second) < self.threshold_px
    }

    pub fn default_left() -> Self {
        Self::new(TrackedPoint::IndexTip, TrackedPoint::ThumbTip, DEFAULT_PINCH_THRESHOLD_PX)
    }

    pub fn default_right() -> Self {
        Self::new(TrackedPoint::MiddleTip, TrackedPoint::ThumbTip, DEFAULT_PINCH_THRESHOLD_PX)
    }

    // Same trigger as right click until a dedicated gesture is chosen.
    pub fn default_auxiliary() -> Self {
        Self::new(TrackedPoint::MiddleTip, TrackedPoint::ThumbTip, DEFAULT_PINCH_THRESHOLD_PX)
    }
}

/// Which bindings were pinched on the previous frame. Only consulted in edge mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldGestures([bool; 3]);

impl HeldGestures {
    pub fn is_held(&self, button: ClickButton) -> bool {
        self.0[button.slot()]
    }

    fn set(&mut self, button: ClickButton, held: bool) {
        self.0[button.slot()] = held;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureOutcome {
    pub clicks: Vec<ClickButton>,
    pub pinched: HeldGestures,
}

pub struct GestureClassifier {
    bindings: [PinchBinding; 3],
    mode: ClickMode,
}

impl GestureClassifier {
    pub fn new(left: PinchBinding, right: PinchBinding, auxiliary: PinchBinding, mode: ClickMode) -> Self {
        Self {
            bindings: [left, right, auxiliary],
            mode,
        }
    }

    pub fn mode(&self) -> ClickMode {
        self.mode
    }

    pub fn binding(&self, button: ClickButton) -> &PinchBinding {
        &self.bindings[button.slot()]
    }

    /// Evaluates every binding independently; several buttons may fire in the same frame.
    pub fn classify(&self, hand: &HandFrame, previously: HeldGestures) -> GestureOutcome {
        let mut outcome = GestureOutcome::default();

        for button in ClickButton::ALL {
            let pinched = self.binding(button).is_pinched(hand);
            outcome.pinched.set(button, pinched);

            let fire = match self.mode {
                ClickMode::Level => pinched,
                ClickMode::Edge => pinched && !previously.is_held(button),
            };
            if fire {
                outcome.clicks.push(button);
            }
        }

        outcome
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(
            PinchBinding::default_left(),
            PinchBinding::default_right(),
            PinchBinding::default_auxiliary(),
            ClickMode::Level,
        )
    }
}
