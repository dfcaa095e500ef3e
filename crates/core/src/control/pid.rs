//! PID controller

use core::fmt;

/// Proportional/integral/derivative gains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// True when every gain is finite
    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

/// What the controlled quantity is
///
/// Feed-forward only makes sense when the setpoint is a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidMode {
    Position,
    Velocity,
}

impl PidMode {
    pub const fn allows_feed_forward(self) -> bool {
        matches!(self, PidMode::Velocity)
    }
}

impl fmt::Display for PidMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PidMode::Position => write!(f, "position"),
            PidMode::Velocity => write!(f, "velocity"),
        }
    }
}

/// Discrete PID controller with output clamping
///
/// The integrator stops accumulating while the output is saturated.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    output_limit: f64,
    integral: f64,
    prev_error: Option<f64>,
}

impl Pid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            output_limit: 1.0,
            integral: 0.0,
            prev_error: None,
        }
    }

    /// Clamp output to `[-limit, +limit]`
    pub fn with_output_limit(mut self, limit: f64) -> Self {
        self.output_limit = if limit > 0.0 { limit } else { 1.0 };
        self
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Advance the controller with `setpoint - measurement`
    pub fn update(&mut self, setpoint: f64, measurement: f64, dt: f64) -> f64 {
        self.step(setpoint - measurement, dt)
    }

    /// Advance the controller with a precomputed error
    pub fn step(&mut self, error: f64, dt: f64) -> f64 {
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        let unclamped = self.gains.kp * error
            + self.gains.ki * (self.integral + error * dt)
            + self.gains.kd * derivative;
        let output = unclamped.clamp(-self.output_limit, self.output_limit);

        if output == unclamped && dt > 0.0 {
            self.integral += error * dt;
        }

        output
    }

    /// Clear accumulated state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_only() {
        let mut pid = Pid::new(PidGains::new(0.5, 0.0, 0.0));
        assert_eq!(pid.update(1.0, 0.0, 0.02), 0.5);
        assert_eq!(pid.update(0.0, 1.0, 0.02), -0.5);
    }

    #[test]
    fn test_output_is_clamped() {
        let mut pid = Pid::new(PidGains::new(10.0, 0.0, 0.0)).with_output_limit(0.6);
        assert_eq!(pid.update(1.0, 0.0, 0.02), 0.6);
        assert_eq!(pid.update(-1.0, 0.0, 0.02), -0.6);
    }

    #[test]
    fn test_derivative_uses_previous_error() {
        let mut pid = Pid::new(PidGains::new(0.0, 0.0, 1.0)).with_output_limit(100.0);
        assert_eq!(pid.step(1.0, 0.1), 0.0);
        let out = pid.step(0.5, 0.1);
        assert!((out - (-5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_integral_accumulates_and_resets() {
        let mut pid = Pid::new(PidGains::new(0.0, 1.0, 0.0)).with_output_limit(100.0);
        pid.step(1.0, 0.5);
        let out = pid.step(1.0, 0.5);
        assert!((out - 1.0).abs() < 1e-9);

        pid.reset();
        let out = pid.step(1.0, 0.5);
        assert!((out - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_feed_forward_mode_rules() {
        assert!(!PidMode::Position.allows_feed_forward());
        assert!(PidMode::Velocity.allows_feed_forward());
    }
}
