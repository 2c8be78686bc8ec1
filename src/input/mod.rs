#[cfg(feature = "input-enigo")]
pub mod enigo;

use crate::{controller::FrameReport, error::Result, gesture::ClickButton};

/// Where pointer effects go. Calls are fire-and-forget: the run loop logs a
/// failure and moves on to the next frame.
pub trait PointerSink {
    fn move_relative(&mut self, dx: f32, dy: f32) -> Result<()>;
    fn click(&mut self, button: ClickButton) -> Result<()>;
}

impl<S: PointerSink + ?Sized> PointerSink for Box<S> {
    fn move_relative(&mut self, dx: f32, dy: f32) -> Result<()> {
        (**self).move_relative(dx, dy)
    }

    fn click(&mut self, button: ClickButton) -> Result<()> {
        (**self).click(button)
    }
}

/// Dry-run sink.
#[derive(Debug, Default)]
pub struct LogSink;

impl PointerSink for LogSink {
    fn move_relative(&mut self, dx: f32, dy: f32) -> Result<()> {
        log::info!("move_relative dx={dx:.2} dy={dy:.2}");
        Ok(())
    }

    fn click(&mut self, button: ClickButton) -> Result<()> {
        log::info!("click {}", button.display_name());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppliedEffects {
    pub moves: usize,
    pub clicks: usize,
    pub failures: usize,
}

/// Applies one frame's effects. Failures are logged and counted, never retried.
pub fn apply_report<S: PointerSink + ?Sized>(sink: &mut S, report: &FrameReport) -> AppliedEffects {
    let mut applied = AppliedEffects::default();

    if let Some(motion) = report.motion {
        match sink.move_relative(motion.dx, motion.dy) {
            Ok(()) => applied.moves += 1,
            Err(err) => {
                log::warn!("pointer move dropped: {err}");
                applied.failures += 1;
            }
        }
    }

    for &button in &report.clicks {
        match sink.click(button) {
            Ok(()) => applied.clicks += 1,
            Err(err) => {
                log::warn!("{} dropped: {err}", button.display_name());
                applied.failures += 1;
            }
        }
    }

    applied
}
