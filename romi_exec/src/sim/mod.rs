//! # Simulated hardware
//!
//! Host side implementations of every driver trait, backed by one shared
//! [`SimWorld`]. The world only moves when the host advances the virtual
//! clock, so a mission runs deterministically and as fast as the host allows.
//!
//! ```text
//!  SimMotor ──duty/enable──▶ ┌──────────┐ ──counter──▶ SimCounter
//!                            │ SimWorld │ ──discharge─▶ SimLineSensors
//!  Sim::advance_us ─────────▶└──────────┘ ──contact──▶ SimBumpers
//! ```

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod world;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use crate::{
    drivers::{BumpSwitches, Clock, DriverError, LineSensorArray, MotorDriver, RotaryCounter},
    robot::{Hardware, RobotParams},
    wheel_ctrl::Side,
};

pub use params::*;
pub use world::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to the simulated world.
#[derive(Clone)]
pub struct Sim {
    world: Rc<RefCell<SimWorld>>,
}

struct SimMotor {
    world: Rc<RefCell<SimWorld>>,
    side: Side,
}

struct SimCounter {
    world: Rc<RefCell<SimWorld>>,
    side: Side,
}

struct SimLineSensors {
    world: Rc<RefCell<SimWorld>>,
}

struct SimBumpers {
    world: Rc<RefCell<SimWorld>>,
}

struct SimClock {
    world: Rc<RefCell<SimWorld>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Sim {
    /// Build a world for a robot with the given parameters.
    pub fn new(params: SimParams, robot: &RobotParams) -> Self {
        Self {
            world: Rc::new(RefCell::new(SimWorld::new(params, robot))),
        }
    }

    /// Create a full set of drivers bound to this world.
    pub fn hardware(&self) -> Hardware {
        Hardware {
            motor_left: Box::new(SimMotor {
                world: self.world.clone(),
                side: Side::Left,
            }),
            motor_right: Box::new(SimMotor {
                world: self.world.clone(),
                side: Side::Right,
            }),
            counter_left: Box::new(SimCounter {
                world: self.world.clone(),
                side: Side::Left,
            }),
            counter_right: Box::new(SimCounter {
                world: self.world.clone(),
                side: Side::Right,
            }),
            line_array: Box::new(SimLineSensors {
                world: self.world.clone(),
            }),
            bumpers: Box::new(SimBumpers {
                world: self.world.clone(),
            }),
            clock: Rc::new(SimClock {
                world: self.world.clone(),
            }),
        }
    }

    pub fn advance_us(&self, us: u64) {
        self.world.borrow_mut().advance_us(us)
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1000)
    }

    pub fn pose(&self) -> Pose {
        self.world.borrow().pose()
    }

    pub fn motor_enabled(&self, side: Side) -> bool {
        self.world.borrow().is_enabled(side)
    }

    /// Units: radians/second
    pub fn wheel_speed(&self, side: Side) -> f64 {
        self.world.borrow().wheel_speed(side)
    }
}

impl MotorDriver for SimMotor {
    fn set_duty(&mut self, duty_pct: f64) -> Result<(), DriverError> {
        if !duty_pct.is_finite() {
            return Err(DriverError::Fault(
                side_name(self.side),
                format!("duty {} is not a number", duty_pct),
            ));
        }

        self.world.borrow_mut().set_duty(self.side, duty_pct);
        Ok(())
    }

    fn enable(&mut self) -> Result<(), DriverError> {
        self.world.borrow_mut().set_enabled(self.side, true);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), DriverError> {
        self.world.borrow_mut().set_enabled(self.side, false);
        Ok(())
    }
}

impl RotaryCounter for SimCounter {
    fn counter(&mut self) -> u32 {
        self.world.borrow().counter(self.side)
    }
}

impl LineSensorArray for SimLineSensors {
    fn discharge_time_us(&mut self, channel: usize, timeout_us: u32) -> u32 {
        self.world.borrow().discharge_time_us(channel).min(timeout_us)
    }
}

impl BumpSwitches for SimBumpers {
    fn read(&mut self) -> [bool; 2] {
        self.world.borrow().bumpers()
    }
}

impl Clock for SimClock {
    fn ticks_ms(&self) -> u32 {
        (self.world.borrow().micros() / 1000) as u32
    }

    fn ticks_us(&self) -> u32 {
        self.world.borrow().micros() as u32
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Left => "left motor",
        Side::Right => "right motor",
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
