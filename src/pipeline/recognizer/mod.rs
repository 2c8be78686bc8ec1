#[cfg(feature = "backend-ort")]
pub mod ort;
pub mod replay;

use crate::types::{Frame, Landmark};

/// Hand landmark oracle. `Ok(None)` means no hand in the frame; an error means
/// the detector could not process it.
pub trait HandDetector {
    fn detect(&mut self, frame: &Frame) -> anyhow::Result<Option<Vec<Landmark>>>;
}

impl<D: HandDetector + ?Sized> HandDetector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> anyhow::Result<Option<Vec<Landmark>>> {
        (**self).detect(frame)
    }
}
