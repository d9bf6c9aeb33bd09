//! Synthetic stick motion.
//!
//! Each channel follows its own periodic curve so that together they sweep
//! the full axis range, hit both extremes and cross both dial thresholds.

use std::f64::consts::FRAC_PI_3;

use crate::controller::state::AxisState;

/// Axis state at `t` seconds since the simulator started
///
/// - right stick: `32767·sin t`, `25000·cos t`
/// - left stick: `20000·sin(t + π/3)`, `20000·sin 2t`
/// - camera dial: `32767·sin(t/2)`
pub fn sample(t: f64) -> AxisState {
    AxisState {
        right_horizontal: scale(32767.0, t.sin()),
        right_vertical: scale(25000.0, t.cos()),
        left_horizontal: scale(20000.0, (t + FRAC_PI_3).sin()),
        left_vertical: scale(20000.0, (2.0 * t).sin()),
        camera_dial: scale(32767.0, (t / 2.0).sin()),
    }
}

fn scale(amplitude: f64, unit: f64) -> i16 {
    // `as` saturates, so rounding noise at the peaks cannot wrap
    (amplitude * unit).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_origin() {
        let state = sample(0.0);
        assert_eq!(state.right_horizontal, 0);
        assert_eq!(state.right_vertical, 25000);
        assert_eq!(state.left_horizontal, 17321);
        assert_eq!(state.left_vertical, 0);
        assert_eq!(state.camera_dial, 0);
    }

    #[test]
    fn test_extremes_are_reached() {
        assert_eq!(sample(PI / 2.0).right_horizontal, i16::MAX);
        assert_eq!(sample(3.0 * PI / 2.0).right_horizontal, -i16::MAX);
        assert_eq!(sample(PI).camera_dial, i16::MAX);
        assert_eq!(sample(3.0 * PI).camera_dial, -i16::MAX);
    }

    #[test]
    fn test_dial_crosses_both_thresholds() {
        let dial: Vec<i16> = (0..1300).map(|i| sample(i as f64 * 0.01).camera_dial).collect();
        assert!(dial.iter().any(|&d| d > 32000));
        assert!(dial.iter().any(|&d| d < -32000));
    }

    #[test]
    fn test_periodic() {
        let period = 4.0 * PI;
        for t in [0.3, 1.7, 5.2] {
            let a = sample(t);
            let b = sample(t + period);
            assert!(a.max_distance(&b) <= 1, "{:?} vs {:?}", a, b);
        }
    }
}
