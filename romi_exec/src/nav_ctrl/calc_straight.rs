//! Straight line drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{DriveGeometry, WheelDemand};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveGeometry {
    /// Wheel demands to drive straight at `speed_ins`, negative to reverse.
    pub fn calc_straight(&self, speed_ins: f64) -> WheelDemand {
        let omega = speed_ins / self.wheel_radius_in;

        self.demand_from_omegas(omega, omega)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
