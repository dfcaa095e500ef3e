//! Simulated intake and shooter.

/// Game piece handling: the intake loads a piece after the roller has run
/// long enough while extended, and the shooter fires it when fed at speed.
#[derive(Debug, Clone)]
pub struct SimIntake {
    /// Roller-on time needed to acquire a piece (s).
    pickup_secs: f64,
    extended: bool,
    roller: f64,
    roller_secs: f64,
    loaded: bool,
    shooter_speed: f64,
    feeding: bool,
    shots_fired: u32,
}

/// Minimum flywheel output for a shot to count
const MIN_SHOT_SPEED: f64 = 0.5;

impl SimIntake {
    pub fn new(pickup_secs: f64) -> Self {
        Self {
            pickup_secs,
            extended: false,
            roller: 0.0,
            roller_secs: 0.0,
            loaded: false,
            shooter_speed: 0.0,
            feeding: false,
            shots_fired: 0,
        }
    }

    pub fn command_intake(&mut self, extended: bool, roller: f64) {
        self.extended = extended;
        self.roller = roller;
    }

    pub fn command_shooter(&mut self, speed: f64, feeding: bool) {
        self.shooter_speed = speed;
        self.feeding = feeding;
    }

    /// Preload a piece, as at the start of a match.
    pub fn preload(&mut self) {
        self.loaded = true;
    }

    pub fn step(&mut self, dt: f64) {
        if self.extended && self.roller > 0.0 && !self.loaded {
            self.roller_secs += dt;
            if self.roller_secs >= self.pickup_secs {
                tracing::debug!(after_secs = self.roller_secs, "intake loaded");
                self.loaded = true;
                self.roller_secs = 0.0;
            }
        }

        if self.loaded && self.feeding && self.shooter_speed >= MIN_SHOT_SPEED {
            self.loaded = false;
            self.shots_fired += 1;
            tracing::debug!(shots = self.shots_fired, "piece fired");
        }
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn extended(&self) -> bool {
        self.extended
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_requires_extension() {
        let mut intake = SimIntake::new(0.1);
        intake.command_intake(false, 1.0);
        intake.step(0.2);
        assert!(!intake.loaded());

        intake.command_intake(true, 1.0);
        intake.step(0.05);
        assert!(!intake.loaded());
        intake.step(0.05);
        assert!(intake.loaded());
    }

    #[test]
    fn test_shot_needs_speed() {
        let mut intake = SimIntake::new(0.1);
        intake.preload();
        intake.command_shooter(0.2, true);
        intake.step(0.02);
        assert!(intake.loaded());

        intake.command_shooter(1.0, true);
        intake.step(0.02);
        assert!(!intake.loaded());
        assert_eq!(intake.shots_fired(), 1);
    }
}
