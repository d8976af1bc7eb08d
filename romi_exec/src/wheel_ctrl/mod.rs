//! Wheel velocity control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{convert::TryFrom, fmt};

use crate::drivers::DriverError;

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which side of the robot a wheel is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Modes of the wheel controller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelMode {
    /// Holding the encoder at zero, waiting for the run flag.
    Init,

    /// Bootstrapping the duty and enabling the motor.
    Starting,

    /// Closed loop speed control.
    Running,

    /// Disabling the motor.
    Stopping,

    /// Motor disabled, waiting for the run flag.
    Idle,
}

/// Possible errors that can occur during WheelCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum WheelCtrlError {
    #[error("Invalid wheel controller mode code {0}")]
    InvalidMode(u8),

    #[error("Motor driver error: {0}")]
    MotorError(#[from] DriverError),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

impl From<WheelMode> for u8 {
    fn from(mode: WheelMode) -> u8 {
        match mode {
            WheelMode::Init => 0,
            WheelMode::Starting => 1,
            WheelMode::Running => 2,
            WheelMode::Stopping => 3,
            WheelMode::Idle => 4,
        }
    }
}

impl TryFrom<u8> for WheelMode {
    type Error = WheelCtrlError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(WheelMode::Init),
            1 => Ok(WheelMode::Starting),
            2 => Ok(WheelMode::Running),
            3 => Ok(WheelMode::Stopping),
            4 => Ok(WheelMode::Idle),
            c => Err(WheelCtrlError::InvalidMode(c)),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Feed-forward plus error term duty law.
///
/// `duty = k_ff * dem + k_i * (dem - meas)`
///
/// The `k_i` term acts on the instantaneous speed error, nothing is
/// accumulated between ticks.
pub fn calc_duty(params: &WheelCtrlParams, omega_dem_rads: f64, omega_meas_rads: f64) -> f64 {
    params.k_ff * omega_dem_rads + params.k_i * (omega_dem_rads - omega_meas_rads)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
