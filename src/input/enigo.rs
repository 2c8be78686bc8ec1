use anyhow::{Context, Result};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

use super::PointerSink;
use crate::{config::AuxiliaryButton, error::Error, gesture::ClickButton};

/// Injects pointer effects through the OS input stack.
pub struct EnigoSink {
    enigo: Enigo,
    auxiliary: AuxiliaryButton,
    carry: SubpixelCarry,
}

impl EnigoSink {
    pub fn new(auxiliary: AuxiliaryButton) -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("failed to connect to the input backend")?;
        log::info!("pointer injection ready (auxiliary gesture -> {auxiliary:?})");
        Ok(Self {
            enigo,
            auxiliary,
            carry: SubpixelCarry::default(),
        })
    }

    fn press(&mut self, button: Button) -> crate::error::Result<()> {
        self.enigo
            .button(button, Direction::Click)
            .map_err(|err| Error::SinkFailure(err.to_string()))
    }
}

impl PointerSink for EnigoSink {
    fn move_relative(&mut self, dx: f32, dy: f32) -> crate::error::Result<()> {
        let (x, y) = self.carry.step(dx, dy);
        if x == 0 && y == 0 {
            return Ok(());
        }
        self.enigo
            .move_mouse(x, y, Coordinate::Rel)
            .map_err(|err| Error::SinkFailure(err.to_string()))
    }

    fn click(&mut self, button: ClickButton) -> crate::error::Result<()> {
        match button {
            ClickButton::Left => self.press(Button::Left),
            ClickButton::Right => self.press(Button::Right),
            ClickButton::Auxiliary => match self.auxiliary {
                AuxiliaryButton::None => {
                    log::debug!("auxiliary gesture has no button bound");
                    Ok(())
                }
                AuxiliaryButton::Left => self.press(Button::Left),
                AuxiliaryButton::Middle => self.press(Button::Middle),
                AuxiliaryButton::Right => self.press(Button::Right),
            },
        }
    }
}

/// The OS moves in whole pixels; the fractional part is kept for the next frame
/// so slow motion is not truncated to nothing.
#[derive(Clone, Copy, Debug, Default)]
struct SubpixelCarry {
    x: f32,
    y: f32,
}

impl SubpixelCarry {
    fn step(&mut self, dx: f32, dy: f32) -> (i32, i32) {
        let total_x = self.x + dx;
        let total_y = self.y + dy;
        let whole_x = total_x.trunc();
        let whole_y = total_y.trunc();
        self.x = total_x - whole_x;
        self.y = total_y - whole_y;
        (whole_x as i32, whole_y as i32)
    }
}
