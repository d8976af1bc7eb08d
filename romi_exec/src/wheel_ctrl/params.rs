//! Parameters structure for WheelCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the wheel velocity controllers, shared by both sides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WheelCtrlParams {
    // ---- CONTROL LAW ----
    /// Feed-forward gain on the commanded speed.
    ///
    /// Units: percent/(radians/second)
    pub k_ff: f64,

    /// Gain on the speed error.
    ///
    /// Units: percent/(radians/second)
    pub k_i: f64,

    // ---- ENCODER ----
    /// Auto-reload value of the encoder counters, the counter modulus is one
    /// more than this.
    pub counter_auto_reload: u32,

    /// Encoder ticks per wheel revolution.
    pub ticks_per_rev: f64,
}

impl Default for WheelCtrlParams {
    fn default() -> Self {
        Self {
            k_ff: 3.955,
            k_i: 0.5,
            counter_auto_reload: 65535,
            ticks_per_rev: 16384.0,
        }
    }
}
