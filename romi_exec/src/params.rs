//! # Robot Executable Parameters
//!
//! This module provides parameters for the robot executable and its task
//! table.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RomiExecParams {
    /// Period of each wheel controller task.
    ///
    /// Units: milliseconds
    pub wheel_ctrl_period_ms: u32,

    /// Priority of the wheel controller tasks, higher runs first.
    pub wheel_ctrl_priority: u8,

    /// Period of the navigation task.
    ///
    /// Units: milliseconds
    pub nav_ctrl_period_ms: u32,

    pub nav_ctrl_priority: u8,

    /// How long the executable runs before shutting down. Zero runs until the
    /// navigation task reaches `Finished`.
    ///
    /// Units: seconds
    pub mission_duration_s: f64,

    /// Pace the simulated clock against the wall clock.
    pub real_time: bool,
}

impl Default for RomiExecParams {
    fn default() -> Self {
        Self {
            wheel_ctrl_period_ms: 20,
            wheel_ctrl_priority: 1,
            nav_ctrl_period_ms: 100,
            nav_ctrl_priority: 1,
            mission_duration_s: 60.0,
            real_time: false,
        }
    }
}
