//! Spin on the spot calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{DriveGeometry, WheelDemand};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveGeometry {
    /// Wheel demands to rotate about the robot's centre at `yaw_rate_rads`,
    /// positive counter clockwise, with no net translation.
    pub fn calc_spin(&self, yaw_rate_rads: f64) -> WheelDemand {
        let omega_right = yaw_rate_rads * self.track_half_width_in / self.wheel_radius_in;

        self.demand_from_omegas(-omega_right, omega_right)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
