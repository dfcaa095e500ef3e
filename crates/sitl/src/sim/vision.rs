//! Simulated vision target.

/// A target at a fixed bearing and distance from the starting pose.
#[derive(Debug, Clone)]
pub struct SimVision {
    /// Bearing of the target from the starting heading (deg, right positive).
    bearing_deg: f64,
    distance_m: f64,
    /// Full horizontal field of view (deg).
    fov_deg: f64,
    visible: bool,
    light: bool,
}

impl SimVision {
    pub fn new(bearing_deg: f64, distance_m: f64, fov_deg: f64) -> Self {
        Self {
            bearing_deg,
            distance_m,
            fov_deg,
            visible: true,
            light: false,
        }
    }

    /// Hide or reveal the target (occlusion, pipeline dropout).
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_light(&mut self, on: bool) {
        self.light = on;
    }

    pub fn light(&self) -> bool {
        self.light
    }

    /// Angle from the robot's heading to the target, wrapped to (-180, 180].
    pub fn relative_angle(&self, heading_deg: f64) -> f64 {
        let mut angle = (self.bearing_deg - heading_deg) % 360.0;
        if angle > 180.0 {
            angle -= 360.0;
        } else if angle <= -180.0 {
            angle += 360.0;
        }
        angle
    }

    /// Target angle if it is visible and inside the field of view.
    pub fn observe(&self, heading_deg: f64) -> Option<f64> {
        let angle = self.relative_angle(heading_deg);
        (self.visible && angle.abs() <= self.fov_deg / 2.0).then_some(angle)
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }
}
