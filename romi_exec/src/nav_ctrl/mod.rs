//! # Navigation control module
//!
//! The [`NavCtrl`] task sequences the whole mission. It sets the cruise speed,
//! follows the line using the centroid from the line sensor, and on a bump
//! runs a fixed open loop manoeuvre around the obstacle:
//!
//! - `InitSpeed` - Publish the cruise speed and raise the run flag.
//! - `LineFollow` - Steer on the line centroid, watch for bumps and the
//!   finish line.
//! - `BumpBackup` - Reverse away from the obstacle.
//! - `Pivot` - Turn away from the obstacle on the spot.
//! - `ArcAroundObstacle` - Drive a wide arc around the obstacle.
//! - `ResumeStraight` - Drive straight back onto the line.
//! - `FinishSpin` - Spin in the finish box.
//! - `Finished` - Run flag cleared, wheels commanded to zero.
//!
//! All drive commands outside of `LineFollow` come from the three drive
//! calculations on [`DriveGeometry`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_arc;
mod calc_spin;
mod calc_straight;
mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::convert::TryFrom;

pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Modes of the navigation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode {
    InitSpeed,
    LineFollow,
    BumpBackup,
    Pivot,
    ArcAroundObstacle,
    ResumeStraight,
    FinishSpin,
    Finished,
}

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("Invalid navigation mode code {0}")]
    InvalidMode(u8),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl From<NavMode> for u8 {
    fn from(mode: NavMode) -> u8 {
        match mode {
            NavMode::InitSpeed => 0,
            NavMode::LineFollow => 1,
            NavMode::BumpBackup => 2,
            NavMode::Pivot => 3,
            NavMode::ArcAroundObstacle => 4,
            NavMode::ResumeStraight => 5,
            NavMode::FinishSpin => 6,
            NavMode::Finished => 7,
        }
    }
}

impl TryFrom<u8> for NavMode {
    type Error = NavCtrlError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NavMode::InitSpeed),
            1 => Ok(NavMode::LineFollow),
            2 => Ok(NavMode::BumpBackup),
            3 => Ok(NavMode::Pivot),
            4 => Ok(NavMode::ArcAroundObstacle),
            5 => Ok(NavMode::ResumeStraight),
            6 => Ok(NavMode::FinishSpin),
            7 => Ok(NavMode::Finished),
            c => Err(NavCtrlError::InvalidMode(c)),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
