//! Differential drive kinematics
//!
//! Conversions between driver-style (throttle, turn) commands and per-side
//! outputs, plus the turn-in-place arc length used by vision centering.

use core::f64::consts::PI;

/// Differential drive kinematics converter (zero-sized type)
pub struct DifferentialDrive;

impl DifferentialDrive {
    /// Convert turn/throttle to left/right outputs with normalization
    ///
    /// 1. Raw outputs: `left = throttle + turn`, `right = throttle - turn`
    /// 2. If either exceeds [-1.0, +1.0], divide both by the larger magnitude
    ///
    /// # Examples
    ///
    /// ```
    /// use tickbot_core::control::DifferentialDrive;
    ///
    /// assert_eq!(DifferentialDrive::mix(0.0, 0.5), (0.5, 0.5));
    /// assert_eq!(DifferentialDrive::mix(1.0, 0.0), (1.0, -1.0));
    /// assert_eq!(DifferentialDrive::mix(0.5, 0.5), (1.0, 0.0));
    /// ```
    #[inline]
    pub fn mix(turn: f64, throttle: f64) -> (f64, f64) {
        let mut left = throttle + turn;
        let mut right = throttle - turn;

        let max_magnitude = libm::fabs(left).max(libm::fabs(right));
        if max_magnitude > 1.0 {
            left /= max_magnitude;
            right /= max_magnitude;
        }

        (left, right)
    }
}

/// Arc each drive side travels to turn in place by `angle_deg`
///
/// `arc = π · track_width · (angle / 360)`. Positive angles turn right
/// (left side forward, right side backward).
#[inline]
pub fn arc_length(track_width: f64, angle_deg: f64) -> f64 {
    PI * track_width * (angle_deg / 360.0)
}

/// Zero small joystick values and rescale the rest to keep full range
#[inline]
pub fn deadband(value: f64, band: f64) -> f64 {
    let magnitude = libm::fabs(value);
    if magnitude <= band || band >= 1.0 {
        0.0
    } else {
        let scaled = (magnitude - band) / (1.0 - band);
        if value < 0.0 {
            -scaled
        } else {
            scaled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_forward() {
        assert_eq!(DifferentialDrive::mix(0.0, 0.5), (0.5, 0.5));
        assert_eq!(DifferentialDrive::mix(0.0, -0.5), (-0.5, -0.5));
    }

    #[test]
    fn test_spin_in_place() {
        assert_eq!(DifferentialDrive::mix(1.0, 0.0), (1.0, -1.0));
        assert_eq!(DifferentialDrive::mix(-1.0, 0.0), (-1.0, 1.0));
    }

    #[test]
    fn test_normalization_preserves_ratio() {
        let (left, right) = DifferentialDrive::mix(1.0, 1.0);
        assert_eq!(left, 1.0);
        assert_eq!(right, 0.0);

        let (left, right) = DifferentialDrive::mix(0.5, 1.0);
        assert!((left - 1.0).abs() < 1e-9);
        assert!((right - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_length_quarter_turn() {
        // 90 degrees with a 1 m track: quarter of a circle of diameter 1 m
        let arc = arc_length(1.0, 90.0);
        assert!((arc - PI / 4.0).abs() < 1e-12);
        assert!(arc_length(0.6, -10.0) < 0.0);
    }

    #[test]
    fn test_deadband() {
        assert_eq!(deadband(0.05, 0.1), 0.0);
        assert_eq!(deadband(-0.1, 0.1), 0.0);
        assert_eq!(deadband(1.0, 0.1), 1.0);
        assert!((deadband(-0.55, 0.1) - (-0.5)).abs() < 1e-9);
    }
}
