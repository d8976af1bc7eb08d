//! Parameters of the simulated world

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Course layout and plant constants of the simulation.
///
/// The course line runs along the world x axis, the robot starts on it
/// facing +x. Under the obstacle the line steps sideways by `line_jog_in` to
/// the right, and carries on parallel to the x axis up to the finish line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Time constant of the wheel speed response to a duty change.
    ///
    /// Units: seconds
    pub wheel_tau_s: f64,

    /// Fraction of the nominal speed per duty the left motor achieves.
    pub left_motor_gain: f64,

    pub right_motor_gain: f64,

    /// Units: inches
    pub line_width_in: f64,

    /// Sideways step of the course line at the obstacle, positive to the
    /// right of the direction of travel.
    ///
    /// Units: inches
    pub line_jog_in: f64,

    /// Position of the transverse finish line along the course.
    ///
    /// Units: inches
    pub finish_line_x_in: f64,

    /// Units: inches
    pub finish_line_width_in: f64,

    /// Centre of the square obstacle, placed on the course line.
    ///
    /// Units: inches
    pub obstacle_x_in: f64,

    /// Units: inches
    pub obstacle_half_size_in: f64,

    /// Distance from the axle forward to the sensor array.
    ///
    /// Units: inches
    pub sensor_offset_in: f64,

    /// Spacing between adjacent sensors.
    ///
    /// Units: inches
    pub sensor_pitch_in: f64,

    /// Width of floor seen by one sensor.
    ///
    /// Units: inches
    pub sensor_footprint_in: f64,

    /// Discharge time over a light floor.
    ///
    /// Units: microseconds
    pub light_discharge_us: f64,

    /// Discharge time with a sensor fully over the line.
    ///
    /// Units: microseconds
    pub dark_discharge_us: f64,

    /// Distance from the axle forward to the bumper switches.
    ///
    /// Units: inches
    pub bumper_offset_in: f64,

    /// Lateral position of each switch either side of the centreline.
    ///
    /// Units: inches
    pub bumper_half_width_in: f64,

    /// Units: inches
    pub start_x_in: f64,

    /// Units: inches
    pub start_y_in: f64,

    /// Units: radians
    pub start_heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            wheel_tau_s: 0.05,
            left_motor_gain: 0.8,
            right_motor_gain: 1.0,
            line_width_in: 0.75,
            line_jog_in: 1.5,
            finish_line_x_in: 150.0,
            finish_line_width_in: 0.75,
            obstacle_x_in: 60.0,
            obstacle_half_size_in: 3.0,
            sensor_offset_in: 2.5,
            sensor_pitch_in: 0.315,
            sensor_footprint_in: 0.12,
            light_discharge_us: 600.0,
            dark_discharge_us: 4800.0,
            bumper_offset_in: 3.3,
            bumper_half_width_in: 2.0,
            start_x_in: 0.0,
            start_y_in: 0.0,
            start_heading_rad: 0.0,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
