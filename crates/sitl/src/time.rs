//! Wall-clock pacing for simulation runs.
//!
//! Simulated time always advances in lockstep with the scheduler period;
//! the mode only decides how long the host waits between steps.

use std::time::Duration;

/// Time synchronization mode for the SITL simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimeMode {
    /// Simulation runs as fast as possible, no synchronization.
    #[default]
    FreeRunning,
    /// One simulated period per wall-clock period.
    RealTime,
    /// Simulation runs at a scaled rate relative to wall-clock time.
    Scaled { factor: f64 },
}

impl TimeMode {
    /// Build from a speed factor; zero or less means free running.
    pub fn from_speed(factor: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            TimeMode::FreeRunning
        } else if factor == 1.0 {
            TimeMode::RealTime
        } else {
            TimeMode::Scaled { factor }
        }
    }

    /// Host wait between steps of `step_us` simulated microseconds.
    ///
    /// `None` means no wait, including scale factors so large the wait
    /// rounds down to nothing.
    pub fn wall_period(&self, step_us: u64) -> Option<Duration> {
        let period = match *self {
            TimeMode::FreeRunning => return None,
            TimeMode::RealTime => Duration::from_micros(step_us),
            TimeMode::Scaled { factor } => {
                Duration::from_secs_f64(step_us as f64 / 1_000_000.0 / factor)
            }
        };
        (!period.is_zero()).then_some(period)
    }
}
