use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    gesture::{ClickMode, DEFAULT_PINCH_THRESHOLD_PX, PinchBinding},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub motion: MotionConfig,
    pub gestures: GestureConfig,
    pub detector: DetectorConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Multiplier from smoothed fingertip pixels to pointer pixels.
    pub sensitivity: f32,
    /// EMA weight in (0, 1]; lower is smoother but lags more.
    pub smoothing_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb to index knuckle distance below which fingertip motion moves the pointer.
    pub engagement_threshold_px: f32,
    pub click_mode: ClickMode,
    pub left: PinchBinding,
    pub right: PinchBinding,
    pub auxiliary: PinchBinding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Handpose model location; the user cache directory is used when unset.
    pub model_path: Option<PathBuf>,
    /// Hand presence score required to report a hand.
    pub min_confidence: f32,
}

/// OS button injected for the auxiliary gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxiliaryButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub auxiliary_button: AuxiliaryButton,
    /// Log pointer effects instead of injecting them.
    pub dry_run: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sensitivity: 8.0,
            smoothing_factor: 0.1,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            engagement_threshold_px: DEFAULT_PINCH_THRESHOLD_PX,
            click_mode: ClickMode::Level,
            left: PinchBinding::default_left(),
            right: PinchBinding::default_right(),
            auxiliary: PinchBinding::default_auxiliary(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            min_confidence: 0.5,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let alpha = self.motion.smoothing_factor;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Error::Config(format!(
                "smoothing_factor must be in (0, 1], got {alpha}"
            )));
        }
        if !self.motion.sensitivity.is_finite() {
            return Err(Error::Config("sensitivity must be finite".to_string()));
        }
        if !(self.gestures.engagement_threshold_px > 0.0) {
            return Err(Error::Config(
                "engagement_threshold_px must be greater than 0".to_string(),
            ));
        }
        for (name, binding) in [
            ("left", &self.gestures.left),
            ("right", &self.gestures.right),
            ("auxiliary", &self.gestures.auxiliary),
        ] {
            if !(binding.threshold_px > 0.0) {
                return Err(Error::Config(format!(
                    "{name} threshold_px must be greater than 0"
                )));
            }
            if binding.first == binding.second {
                return Err(Error::Config(format!(
                    "{name} binding needs two different landmarks"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.detector.min_confidence) {
            return Err(Error::Config(
                "min_confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}
