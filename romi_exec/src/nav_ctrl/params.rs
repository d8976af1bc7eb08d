//! Parameters structure for NavCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::ArcDirection;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fixed robot geometry and the open loop speed to duty calibration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveGeometry {
    /// Half of the distance between the wheel contact points.
    ///
    /// Units: inches
    pub track_half_width_in: f64,

    /// Units: inches
    pub wheel_radius_in: f64,

    /// Steady state wheel speed per percent of duty.
    ///
    /// Units: (radians/second)/percent
    pub omega_per_duty_pct: f64,

    /// Largest duty magnitude the motor driver accepts.
    ///
    /// Units: percent
    pub max_duty_pct: f64,
}

/// Parameters for the navigation task.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavCtrlParams {
    pub geometry: DriveGeometry,

    // ---- LINE FOLLOWING ----
    /// Cruise speed for the initial dash segment.
    ///
    /// Units: inches/second
    pub dash_speed_ins: f64,

    /// Duration of the initial dash segment, measured from the first step.
    ///
    /// Units: milliseconds
    pub dash_duration_ms: u32,

    /// Cruise speed once the dash segment is over.
    ///
    /// Units: inches/second
    pub cruise_speed_ins: f64,

    /// Offset added to the left wheel when driving straight, compensating for
    /// the weaker left motor.
    ///
    /// Units: radians/second
    pub left_trim_rads: f64,

    /// Wheel speed change per unit of centroid.
    ///
    /// Units: (radians/second)/centroid
    pub steer_gain: f64,

    // ---- OBSTACLE MANOEUVRE ----
    /// Units: inches/second
    pub backup_speed_ins: f64,
    /// Units: milliseconds
    pub backup_duration_ms: u32,

    /// Yaw rate of the pivot away from the obstacle, positive counter
    /// clockwise.
    ///
    /// Units: radians/second
    pub pivot_yaw_rate_rads: f64,
    /// Units: milliseconds
    pub pivot_duration_ms: u32,

    /// Units: inches/second
    pub arc_speed_ins: f64,
    /// Units: inches
    pub arc_radius_in: f64,
    pub arc_direction: ArcDirection,
    /// Units: milliseconds
    pub arc_duration_ms: u32,

    /// Units: inches/second
    pub resume_speed_ins: f64,
    /// Units: milliseconds
    pub resume_duration_ms: u32,

    // ---- FINISH ----
    /// Yaw rate of the spin on reaching the finish line, positive counter
    /// clockwise.
    ///
    /// Units: radians/second
    pub finish_yaw_rate_rads: f64,
    /// Units: milliseconds
    pub finish_duration_ms: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveGeometry {
    fn default() -> Self {
        Self {
            track_half_width_in: 2.775,
            wheel_radius_in: 1.375,
            omega_per_duty_pct: 0.2528,
            max_duty_pct: 100.0,
        }
    }
}

impl Default for NavCtrlParams {
    fn default() -> Self {
        Self {
            geometry: DriveGeometry::default(),
            dash_speed_ins: 6.0,
            dash_duration_ms: 15000,
            cruise_speed_ins: 3.0,
            left_trim_rads: 1.2,
            steer_gain: 0.065,
            backup_speed_ins: 3.0,
            backup_duration_ms: 1500,
            pivot_yaw_rate_rads: -std::f64::consts::PI,
            pivot_duration_ms: 500,
            arc_speed_ins: 5.0,
            arc_radius_in: 40.0,
            arc_direction: ArcDirection::Ccw,
            arc_duration_ms: 7500,
            resume_speed_ins: 3.0,
            resume_duration_ms: 3000,
            finish_yaw_rate_rads: -std::f64::consts::PI,
            finish_duration_ms: 1000,
        }
    }
}
