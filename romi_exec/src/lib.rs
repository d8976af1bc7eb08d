//! # Robot library.
//!
//! Control software for a two wheeled line following robot. Four cooperative
//! tasks share a handful of single value cells:
//!
//! - Two wheel velocity controllers (`wheel_ctrl`), each turning a commanded
//!   wheel speed into a motor duty using its encoder (`encoder`).
//! - The navigation task (`nav_ctrl`), which follows the line using the
//!   centroid from the line sensor array (`line_sensor`), runs the obstacle
//!   manoeuvre when a bump switch closes, and spins on the finish line.
//!
//! The tasks reach the hardware only through the traits in `drivers`, so the
//! same code runs against the simulated hardware in `sim`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Hardware capability traits
pub mod drivers;

/// Encoder integrator - unwraps the quadrature counter into a position
pub mod encoder;

/// Line centroid estimator - reduces the line sensor array to a steering error
pub mod line_sensor;

/// Mission termination - interrupt, finish and duration stop conditions
pub mod mission;

/// Navigation control - mission sequencing, line following and manoeuvres
pub mod nav_ctrl;

/// Executable parameters
pub mod params;

/// Robot assembly - builds and owns the tasks
pub mod robot;

/// Cooperative priority scheduler
pub mod sched;

/// Shared single value cells between tasks
pub mod shares;

/// Simulated hardware
#[cfg(feature = "sim")]
pub mod sim;

/// Wheel velocity control - per wheel closed loop speed control
pub mod wheel_ctrl;

#[cfg(test)]
mod test_util;
