//! # Mission termination
//!
//! Decides when the host loop hands over to the robot shutdown: on an external
//! interrupt, when navigation reaches `Finished`, or once the mission duration
//! has elapsed. The interrupt only raises a flag, the loop notices it at the
//! end of the current cycle so the shutdown always runs from the main thread.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{nav_ctrl::NavMode, robot::Robot};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Why a mission run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    Finished,
    DurationElapsed,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Stop conditions of one mission run.
#[derive(Debug, Clone)]
pub struct Termination {
    /// Zero for no limit.
    ///
    /// Units: milliseconds
    duration_ms: i32,

    interrupted: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Termination {
    pub fn new(duration_ms: i32) -> Self {
        Self {
            duration_ms,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raise the interrupt flag on SIGINT.
    ///
    /// Only one handler can be installed per process.
    pub fn install_interrupt_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.interrupt_flag();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
    }

    /// The flag an interrupt handler raises.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Check the stop conditions after a cycle, an interrupt wins over the
    /// others.
    pub fn check(&self, robot: &Robot) -> Option<StopReason> {
        if self.is_interrupted() {
            Some(StopReason::Interrupted)
        } else if robot.nav_mode() == Some(NavMode::Finished) {
            Some(StopReason::Finished)
        } else if self.duration_ms > 0 && robot.elapsed_ms() >= self.duration_ms {
            Some(StopReason::DurationElapsed)
        } else {
            None
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::Finished => write!(f, "mission finished"),
            StopReason::DurationElapsed => write!(f, "mission duration elapsed"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
