//! Timing statistics for the tick loop
//!
//! - [`TickStats`]: per-tick execution time, period and deadline tracking
//! - [`SchedulerStats`]: run counters and overall load

/// Runtime statistics for the tick loop
///
/// Updated by the run driver after every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Last tick execution time in microseconds
    pub last_execution_us: u32,

    /// Average execution time in microseconds (exponential moving average)
    ///
    /// Uses EMA with alpha = 0.1 to smooth out variations while remaining responsive
    /// to changes in execution time.
    pub avg_execution_us: u32,

    /// Maximum execution time observed in microseconds
    pub max_execution_us: u32,

    /// Number of ticks whose execution time exceeded the budget
    pub deadline_misses: u32,

    /// Last measured period in microseconds (time between ticks)
    pub last_period_us: u32,

    /// Average jitter in microseconds (deviation from target period)
    pub avg_jitter_us: u32,

    /// Total number of ticks
    pub tick_count: u64,
}

impl TickStats {
    /// Update statistics with a new tick measurement
    ///
    /// # Arguments
    ///
    /// * `execution_us` - Duration of the tick in microseconds
    /// * `period_us` - Time since the previous tick, `None` for the first tick
    /// * `target_period_us` - Expected period from the scheduler rate
    /// * `budget_us` - Maximum allowed execution time
    pub fn update(
        &mut self,
        execution_us: u32,
        period_us: Option<u32>,
        target_period_us: u32,
        budget_us: u32,
    ) {
        self.last_execution_us = execution_us;
        self.tick_count = self.tick_count.saturating_add(1);

        // EMA with alpha = 0.1: avg_new = (value + 9 * avg_old) / 10
        if self.tick_count == 1 {
            self.avg_execution_us = execution_us;
        } else {
            self.avg_execution_us = ema(execution_us, self.avg_execution_us);
        }

        self.max_execution_us = self.max_execution_us.max(execution_us);

        if execution_us > budget_us {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
        }

        // Jitter is only meaningful once there are two ticks to compare
        if let Some(period_us) = period_us {
            let jitter = period_us.abs_diff(target_period_us);
            self.avg_jitter_us = if self.last_period_us == 0 {
                jitter
            } else {
                ema(jitter, self.avg_jitter_us)
            };
            self.last_period_us = period_us;
        }
    }

    /// Reset all statistics to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn ema(value: u32, average: u32) -> u32 {
    ((u64::from(value) + 9 * u64::from(average)) / 10) as u32
}

/// Aggregate scheduler statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Tick execution time as a percentage of the tick period (0-100)
    pub cpu_load_percent: u8,

    /// Total deadline misses
    pub total_deadline_misses: u32,

    /// Time since the first tick in milliseconds
    pub uptime_ms: u64,

    /// Runs installed with `start`
    pub runs_started: u32,

    /// Runs whose root completed naturally
    pub runs_completed: u32,

    /// Runs cancelled or failed
    pub runs_interrupted: u32,
}

impl SchedulerStats {
    /// Update CPU load percentage
    ///
    /// # Arguments
    ///
    /// * `total_execution_us` - Execution time in the measurement window
    /// * `window_us` - Duration of measurement window in microseconds
    pub fn update_cpu_load(&mut self, total_execution_us: u64, window_us: u64) {
        if window_us > 0 {
            let load = (total_execution_us * 100) / window_us;
            self.cpu_load_percent = load.min(100) as u8;
        }
    }
}
