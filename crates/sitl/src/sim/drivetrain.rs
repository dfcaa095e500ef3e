//! Simulated differential drivetrain.
//!
//! Each side either follows its percent command scaled by the free speed,
//! or, in position mode, drives toward its setpoint no faster than the free
//! speed. Heading follows from the difference in side travel.

/// Drive outputs latched from the last applied tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveCommand {
    pub left_percent: f64,
    pub right_percent: f64,
    pub position_mode: bool,
    pub left_position: f64,
    pub right_position: f64,
    pub high_gear: bool,
}

#[derive(Debug, Clone)]
pub struct SimDrivetrain {
    /// Wheel separation in meters.
    track_width_m: f64,
    /// Side speed at full output in low gear (m/s).
    low_gear_speed: f64,
    /// Side speed at full output in high gear (m/s).
    high_gear_speed: f64,
    command: DriveCommand,
    left_distance: f64,
    right_distance: f64,
    left_velocity: f64,
    right_velocity: f64,
    /// Degrees, clockwise positive, unwrapped.
    heading_deg: f64,
}

impl SimDrivetrain {
    pub fn new(track_width_m: f64, low_gear_speed: f64, high_gear_speed: f64) -> Self {
        Self {
            track_width_m,
            low_gear_speed,
            high_gear_speed,
            command: DriveCommand::default(),
            left_distance: 0.0,
            right_distance: 0.0,
            left_velocity: 0.0,
            right_velocity: 0.0,
            heading_deg: 0.0,
        }
    }

    pub fn command(&mut self, command: DriveCommand) {
        self.command = command;
    }

    pub fn last_command(&self) -> DriveCommand {
        self.command
    }

    fn free_speed(&self) -> f64 {
        if self.command.high_gear {
            self.high_gear_speed
        } else {
            self.low_gear_speed
        }
    }

    fn side_velocity(&self, percent: f64, setpoint: f64, distance: f64, dt: f64) -> f64 {
        let max = self.free_speed();
        if self.command.position_mode {
            ((setpoint - distance) / dt).clamp(-max, max)
        } else {
            percent.clamp(-1.0, 1.0) * max
        }
    }

    /// Advance the drivetrain by `dt` seconds.
    pub fn integrate(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let cmd = self.command;
        self.left_velocity =
            self.side_velocity(cmd.left_percent, cmd.left_position, self.left_distance, dt);
        self.right_velocity =
            self.side_velocity(cmd.right_percent, cmd.right_position, self.right_distance, dt);

        let left_step = self.left_velocity * dt;
        let right_step = self.right_velocity * dt;
        self.left_distance += left_step;
        self.right_distance += right_step;

        // Left side ahead of right turns the robot clockwise
        self.heading_deg += ((left_step - right_step) / self.track_width_m).to_degrees();
    }

    pub fn left_distance(&self) -> f64 {
        self.left_distance
    }

    pub fn right_distance(&self) -> f64 {
        self.right_distance
    }

    pub fn left_velocity(&self) -> f64 {
        self.left_velocity
    }

    pub fn right_velocity(&self) -> f64 {
        self.right_velocity
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }
}
