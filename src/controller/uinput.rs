//! # Virtual Gamepad (uinput)
//!
//! Presents the translated sticks and dial buttons to Linux as a virtual
//! gamepad through `/dev/uinput`.
//!
//! | Input | evdev code |
//! |-------|------------|
//! | Left stick X / Y | ABS_X / ABS_Y (inverted) |
//! | Right stick X / Y | ABS_RX / ABS_RY (inverted) |
//! | Y button | BTN_NORTH |
//! | B button | BTN_EAST |
//!
//! evdev reports negative Y as "up" while a pushed stick reads positive, so
//! both vertical axes are negated. `i16::MIN` saturates to `i16::MAX`.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use tracing::info;

use super::output::{GamepadButton, GamepadReport, OutputSink};
use crate::error::{BridgeError, Result};

/// Jitter the kernel may filter on each axis
const AXIS_FUZZ: i32 = 16;

/// Centre region reported as flat
const AXIS_FLAT: i32 = 128;

const STICK_AXES: [AbsoluteAxisType; 4] = [
    AbsoluteAxisType::ABS_X,
    AbsoluteAxisType::ABS_Y,
    AbsoluteAxisType::ABS_RX,
    AbsoluteAxisType::ABS_RY,
];

fn button_key(button: GamepadButton) -> Key {
    match button {
        GamepadButton::Y => Key::BTN_NORTH,
        GamepadButton::B => Key::BTN_EAST,
    }
}

/// Linux virtual gamepad backed by uinput
///
/// The device is removed from the system when this value is dropped.
pub struct UinputGamepad {
    device: VirtualDevice,
    pending: GamepadReport,
}

impl std::fmt::Debug for UinputGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputGamepad")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl UinputGamepad {
    /// Create the virtual device
    ///
    /// # Errors
    ///
    /// Returns `Driver` if `/dev/uinput` cannot be opened (usually missing
    /// permissions or the uinput module is not loaded).
    pub fn create(name: &str) -> Result<Self> {
        let driver_err = |e: std::io::Error| BridgeError::Driver(format!("uinput: {}", e));

        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_SOUTH);
        keys.insert(Key::BTN_EAST);
        keys.insert(Key::BTN_NORTH);
        keys.insert(Key::BTN_WEST);

        let abs_info = AbsInfo::new(0, i16::MIN as i32, i16::MAX as i32, AXIS_FUZZ, AXIS_FLAT, 0);

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(driver_err)?
            .name(name)
            .with_keys(&keys)
            .map_err(driver_err)?;

        for axis in STICK_AXES {
            builder = builder
                .with_absolute_axis(&UinputAbsSetup::new(axis, abs_info))
                .map_err(driver_err)?;
        }

        let device = builder.build().map_err(driver_err)?;
        info!("Created virtual gamepad \"{}\"", name);

        Ok(Self {
            device,
            pending: GamepadReport::default(),
        })
    }

    fn events(report: &GamepadReport) -> [InputEvent; 6] {
        let abs = |axis: AbsoluteAxisType, value: i16| InputEvent::new(EventType::ABSOLUTE, axis.0, value as i32);
        let key = |button: GamepadButton, pressed: bool| {
            InputEvent::new(EventType::KEY, button_key(button).code(), pressed as i32)
        };

        [
            abs(AbsoluteAxisType::ABS_X, report.left.0),
            abs(AbsoluteAxisType::ABS_Y, report.left.1.saturating_neg()),
            abs(AbsoluteAxisType::ABS_RX, report.right.0),
            abs(AbsoluteAxisType::ABS_RY, report.right.1.saturating_neg()),
            key(GamepadButton::Y, report.y),
            key(GamepadButton::B, report.b),
        ]
    }
}

impl OutputSink for UinputGamepad {
    fn set_left_axis(&mut self, x: i16, y: i16) {
        self.pending.left = (x, y);
    }

    fn set_right_axis(&mut self, x: i16, y: i16) {
        self.pending.right = (x, y);
    }

    fn set_button(&mut self, button: GamepadButton, pressed: bool) {
        self.pending.set_button(button, pressed);
    }

    /// Emit all staged values followed by a single SYN_REPORT
    fn commit(&mut self) -> Result<()> {
        self.device
            .emit(&Self::events(&self.pending))
            .map_err(|e| BridgeError::Driver(format!("uinput emit failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(button_key(GamepadButton::Y), Key::BTN_NORTH);
        assert_eq!(button_key(GamepadButton::B), Key::BTN_EAST);
    }

    #[test]
    fn test_report_events() {
        let report = GamepadReport {
            left: (1, -2),
            right: (3, -4),
            y: true,
            b: false,
        };
        let events = UinputGamepad::events(&report);

        assert_eq!(events[0].code(), AbsoluteAxisType::ABS_X.0);
        assert_eq!(events[0].value(), 1);
        assert_eq!(events[1].code(), AbsoluteAxisType::ABS_Y.0);
        assert_eq!(events[1].value(), 2);
        assert_eq!(events[2].value(), 3);
        assert_eq!(events[3].code(), AbsoluteAxisType::ABS_RY.0);
        assert_eq!(events[3].value(), 4);
        assert_eq!(events[4].code(), Key::BTN_NORTH.code());
        assert_eq!(events[4].value(), 1);
        assert_eq!(events[5].value(), 0);
    }

    #[test]
    fn test_vertical_axes_saturate_when_inverted() {
        let report = GamepadReport {
            left: (0, i16::MAX),
            right: (0, i16::MIN),
            ..GamepadReport::default()
        };
        let events = UinputGamepad::events(&report);

        assert_eq!(events[1].value(), -(i16::MAX as i32));
        assert_eq!(events[3].value(), i16::MAX as i32);
    }

    // Needs write access to /dev/uinput
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_create_virtual_device() {
        let mut gamepad = UinputGamepad::create("rc-nx-bridge test pad").unwrap();
        gamepad.set_left_axis(100, -100);
        gamepad.commit().unwrap();
    }
}
