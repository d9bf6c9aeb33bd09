//! # Gamepad Output
//!
//! The [`OutputSink`] trait is the boundary to whatever presents axes and
//! buttons to the operating system. The camera dial has no gamepad axis of its
//! own; it drives two buttons through a threshold rule instead.
//!
//! | Dial | Y | B |
//! |------|---|---|
//! | above `threshold` | pressed | released |
//! | below `-threshold` | released | pressed |
//! | otherwise | released | released |

use tracing::{debug, info};

use super::state::AxisState;
use crate::error::Result;

/// Default dial deflection needed to press a button
pub const DEFAULT_DIAL_THRESHOLD: i16 = 32000;

/// Buttons driven by the camera dial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    /// Dial turned fully one way
    Y,
    /// Dial turned fully the other way
    B,
}

/// Destination for gamepad state
///
/// Setters stage changes; `commit` presents everything staged as one update.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send {
    fn set_left_axis(&mut self, x: i16, y: i16);

    fn set_right_axis(&mut self, x: i16, y: i16);

    fn set_button(&mut self, button: GamepadButton, pressed: bool);

    fn commit(&mut self) -> Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn set_left_axis(&mut self, x: i16, y: i16) {
        (**self).set_left_axis(x, y)
    }

    fn set_right_axis(&mut self, x: i16, y: i16) {
        (**self).set_right_axis(x, y)
    }

    fn set_button(&mut self, button: GamepadButton, pressed: bool) {
        (**self).set_button(button, pressed)
    }

    fn commit(&mut self) -> Result<()> {
        (**self).commit()
    }
}

/// Button levels produced by the dial rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialButtons {
    pub y: bool,
    pub b: bool,
}

/// Apply the dial threshold rule
pub fn dial_buttons(dial: i16, threshold: i16) -> DialButtons {
    if dial > threshold {
        DialButtons { y: true, b: false }
    } else if (dial as i32) < -(threshold as i32) {
        DialButtons { y: false, b: true }
    } else {
        DialButtons::default()
    }
}

/// Stage a full axis snapshot on `sink` and commit it
pub fn apply_state<S: OutputSink + ?Sized>(sink: &mut S, state: &AxisState, threshold: i16) -> Result<()> {
    sink.set_left_axis(state.left_horizontal, state.left_vertical);
    sink.set_right_axis(state.right_horizontal, state.right_vertical);

    let buttons = dial_buttons(state.camera_dial, threshold);
    sink.set_button(GamepadButton::Y, buttons.y);
    sink.set_button(GamepadButton::B, buttons.b);

    sink.commit()
}

/// Everything a sink presents in one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadReport {
    pub left: (i16, i16),
    pub right: (i16, i16),
    pub y: bool,
    pub b: bool,
}

impl GamepadReport {
    pub fn set_button(&mut self, button: GamepadButton, pressed: bool) {
        match button {
            GamepadButton::Y => self.y = pressed,
            GamepadButton::B => self.b = pressed,
        }
    }
}

/// Sink that only logs committed state
///
/// Used for dry runs where no virtual device can be created.
#[derive(Debug, Default)]
pub struct LogSink {
    pending: GamepadReport,
    committed: Option<GamepadReport>,
}

impl LogSink {
    pub fn new() -> Self {
        info!("Using log-only gamepad output");
        Self::default()
    }

    /// Last committed report
    pub fn last_report(&self) -> Option<GamepadReport> {
        self.committed
    }
}

impl OutputSink for LogSink {
    fn set_left_axis(&mut self, x: i16, y: i16) {
        self.pending.left = (x, y);
    }

    fn set_right_axis(&mut self, x: i16, y: i16) {
        self.pending.right = (x, y);
    }

    fn set_button(&mut self, button: GamepadButton, pressed: bool) {
        self.pending.set_button(button, pressed);
    }

    fn commit(&mut self) -> Result<()> {
        if self.committed != Some(self.pending) {
            debug!(
                "Gamepad: left=({}, {}) right=({}, {}) Y={} B={}",
                self.pending.left.0,
                self.pending.left.1,
                self.pending.right.0,
                self.pending.right.1,
                self.pending.y,
                self.pending.b
            );
        }
        self.committed = Some(self.pending);
        Ok(())
    }
}
