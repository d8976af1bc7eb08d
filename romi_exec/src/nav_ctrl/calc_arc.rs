//! Fixed radius arc calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{ArcDirection, DriveGeometry, WheelDemand};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveGeometry {
    /// Wheel demands to drive a circle of `radius_in` at `speed_ins`
    /// measured at the robot's centre.
    pub fn calc_arc(&self, speed_ins: f64, radius_in: f64, direction: ArcDirection) -> WheelDemand {
        let yaw_rate_rads = match direction {
            ArcDirection::Ccw => speed_ins / radius_in,
            ArcDirection::Cw => -speed_ins / radius_in,
        };

        let speed_left_ins = speed_ins - self.track_half_width_in * yaw_rate_rads;
        let speed_right_ins = speed_ins + self.track_half_width_in * yaw_rate_rads;

        self.demand_from_omegas(
            speed_left_ins / self.wheel_radius_in,
            speed_right_ins / self.wheel_radius_in,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
