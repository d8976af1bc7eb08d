//! Parameters structure for the line sensor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for reading and classifying the reflectance sensors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineSensorParams {
    /// Discharge time at or above which a channel is over a dark surface.
    ///
    /// Units: microseconds
    pub dark_threshold_us: u32,

    /// Longest a single channel read may take.
    ///
    /// Units: microseconds
    pub discharge_timeout_us: u32,
}

impl Default for LineSensorParams {
    fn default() -> Self {
        Self {
            dark_threshold_us: 4000,
            discharge_timeout_us: 5000,
        }
    }
}
