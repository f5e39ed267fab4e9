//! Output seams: the screen that shows frames and the panel's status LEDs.

use anyhow::Result;
use image::RgbImage;

use crate::pagination::{Button, ButtonState};

/// Something that can show a full frame.
pub trait Display {
    /// Replaces whatever is on screen with `frame`.
    ///
    /// # Errors
    /// Returns an error if the device cannot be written.
    fn push(&mut self, frame: &RgbImage) -> Result<()>;
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn push(&mut self, frame: &RgbImage) -> Result<()> {
        (**self).push(frame)
    }
}

/// Four RGB status LEDs next to the buttons.
pub trait LedPanel {
    fn set_led(&mut self, index: usize, rgb: [u8; 3], brightness: u8);

    /// Latches pending LED changes.
    ///
    /// # Errors
    /// Returns an error if the panel cannot be written.
    fn flush(&mut self) -> Result<()>;
}

impl<P: LedPanel + ?Sized> LedPanel for Box<P> {
    fn set_led(&mut self, index: usize, rgb: [u8; 3], brightness: u8) {
        (**self).set_led(index, rgb, brightness);
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

pub const LED_BRIGHTNESS: u8 = 10;

impl Button {
    /// LED slot and color lit while this button is held.
    pub fn led(self) -> (usize, [u8; 3]) {
        match self {
            Button::PrevPost => (0, [255, 0, 0]),
            Button::NextPost => (1, [0, 255, 0]),
            Button::PrevImage => (2, [0, 0, 255]),
            Button::NextImage => (3, [255, 0, 255]),
        }
    }
}

/// Mirrors a panel read on the LEDs: held buttons lit, the others off.
///
/// # Errors
/// Propagates the panel's flush error.
pub fn show_buttons<P: LedPanel + ?Sized>(panel: &mut P, state: ButtonState) -> Result<()> {
    for (button, held) in Button::ALL.into_iter().zip(state.held()) {
        let (index, rgb) = button.led();
        panel.set_led(index, rgb, LED_BRIGHTNESS * u8::from(held));
    }
    panel.flush()
}
