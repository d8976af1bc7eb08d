//! Wheel demand type produced by the drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::DriveGeometry;
use util::maths::saturate_upper;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per wheel demands for one drive command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelDemand {
    /// Open loop duty, saturated at the maximum but not at its negative.
    ///
    /// Units: percent
    pub duty_left_pct: f64,

    /// Units: percent
    pub duty_right_pct: f64,

    /// Units: radians/second
    pub omega_left_rads: f64,

    /// Units: radians/second
    pub omega_right_rads: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of travel around an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ArcDirection {
    /// Counter clockwise, turning left.
    Ccw,

    /// Clockwise, turning right.
    Cw,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveGeometry {
    /// Build a demand from wheel speeds, adding the open loop duty.
    ///
    /// Only the positive duty is saturated, the direction is carried by the
    /// sign and the motor driver limits the magnitude.
    pub(crate) fn demand_from_omegas(&self, omega_left_rads: f64, omega_right_rads: f64) -> WheelDemand {
        WheelDemand {
            duty_left_pct: saturate_upper(omega_left_rads / self.omega_per_duty_pct, self.max_duty_pct),
            duty_right_pct: saturate_upper(omega_right_rads / self.omega_per_duty_pct, self.max_duty_pct),
            omega_left_rads,
            omega_right_rads,
        }
    }
}
