//! # Axis Mapping
//!
//! Converts the remote controller's native stick units to gamepad axis values
//! and back.
//!
//! ## Value Ranges
//!
//! - Native stick/dial: 364..=1684, centre 1024 (±660)
//! - Gamepad axis: -32768..=32767, centre 0
//!
//! The scale factor is 8192/165, so one native unit is about 49.65 axis
//! units. Both directions use integer division truncating toward zero, which
//! makes `to_axis(from_axis(x))` lossy by up to one native step.

/// Native stick centre
pub const RAW_CENTER: u16 = 1024;

/// Native stick minimum (full deflection)
pub const RAW_MIN: u16 = 364;

/// Native stick maximum (full deflection)
pub const RAW_MAX: u16 = 1684;

const SCALE_NUMERATOR: i32 = 2 * 4096;
const SCALE_DENOMINATOR: i32 = 165;

/// Axis units represented by one native unit, rounded up
pub const AXIS_QUANTIZATION_STEP: i32 = (SCALE_NUMERATOR + SCALE_DENOMINATOR - 1) / SCALE_DENOMINATOR;

/// Map a native stick value to a gamepad axis value
///
/// Results outside the signed 16-bit range saturate at either end.
///
/// # Examples
///
/// ```
/// use rc_nx_bridge::controller::mapping::to_axis;
///
/// assert_eq!(to_axis(1024), 0);
/// assert_eq!(to_axis(364), i16::MIN);
/// assert_eq!(to_axis(1684), i16::MAX);
/// ```
pub fn to_axis(raw: u16) -> i16 {
    let value = raw as i32 - RAW_CENTER as i32;
    let mapped = value * SCALE_NUMERATOR / SCALE_DENOMINATOR;
    mapped.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Map a gamepad axis value back to native stick units
///
/// `mapped` is clamped to the signed 16-bit range first.
pub fn from_axis(mapped: i32) -> u16 {
    let mapped = mapped.clamp(i16::MIN as i32, i16::MAX as i32);
    let raw = mapped * SCALE_DENOMINATOR / SCALE_NUMERATOR + RAW_CENTER as i32;
    raw as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_center_maps_to_zero() {
        assert_eq!(to_axis(RAW_CENTER), 0);
        assert_eq!(from_axis(0), RAW_CENTER);
    }

    #[test]
    fn test_native_extremes_reach_axis_extremes() {
        assert_eq!(to_axis(RAW_MIN), i16::MIN);
        assert_eq!(to_axis(RAW_MAX), i16::MAX);
    }

    #[test]
    fn test_out_of_range_inputs_saturate() {
        assert_eq!(to_axis(0), i16::MIN);
        assert_eq!(to_axis(u16::MAX), i16::MAX);
        assert_eq!(to_axis(2000), i16::MAX);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // +1 native unit = 49.65 axis units
        assert_eq!(to_axis(1025), 49);
        assert_eq!(to_axis(1023), -49);
    }

    #[test]
    fn test_from_axis_extremes() {
        assert_eq!(from_axis(i16::MIN as i32), RAW_MIN);
        assert_eq!(from_axis(i16::MAX as i32), RAW_MAX - 1);
        assert_eq!(from_axis(1_000_000), RAW_MAX - 1);
        assert_eq!(from_axis(-1_000_000), RAW_MIN);
    }

    #[test]
    fn test_quantization_step() {
        assert_eq!(AXIS_QUANTIZATION_STEP, 50);
    }

    proptest! {
        #[test]
        fn to_axis_is_monotonic(raw in 0u16..u16::MAX) {
            prop_assert!(to_axis(raw) <= to_axis(raw + 1));
        }

        #[test]
        fn round_trip_within_one_step(mapped in any::<i16>()) {
            let back = to_axis(from_axis(mapped as i32)) as i32;
            prop_assert!(
                (back - mapped as i32).abs() <= AXIS_QUANTIZATION_STEP,
                "{} came back as {}", mapped, back
            );
        }

        #[test]
        fn from_axis_stays_in_native_range(mapped in any::<i32>()) {
            let raw = from_axis(mapped);
            prop_assert!((RAW_MIN..=RAW_MAX).contains(&raw));
        }
    }
}
