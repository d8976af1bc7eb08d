//! Test doubles for the hardware capability traits.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::drivers::{BumpSwitches, Clock, DriverError, LineSensorArray, MotorDriver, RotaryCounter};

/// A call made on a [`RecordingMotor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorCall {
    SetDuty(f64),
    Enable,
    Disable,
}

/// Motor driver which records every call made on it.
#[derive(Clone, Default)]
pub struct RecordingMotor {
    calls: Rc<RefCell<Vec<MotorCall>>>,
}

impl RecordingMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MotorCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: MotorCall) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn last_duty(&self) -> Option<f64> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            MotorCall::SetDuty(d) => Some(*d),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear()
    }
}

impl MotorDriver for RecordingMotor {
    fn set_duty(&mut self, duty_pct: f64) -> Result<(), DriverError> {
        self.calls.borrow_mut().push(MotorCall::SetDuty(duty_pct));
        Ok(())
    }

    fn enable(&mut self) -> Result<(), DriverError> {
        self.calls.borrow_mut().push(MotorCall::Enable);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), DriverError> {
        self.calls.borrow_mut().push(MotorCall::Disable);
        Ok(())
    }
}

/// Motor driver whose every call fails.
pub struct FaultyMotor;

impl MotorDriver for FaultyMotor {
    fn set_duty(&mut self, _duty_pct: f64) -> Result<(), DriverError> {
        Err(DriverError::Fault("test", "set_duty".into()))
    }

    fn enable(&mut self) -> Result<(), DriverError> {
        Err(DriverError::Fault("test", "enable".into()))
    }

    fn disable(&mut self) -> Result<(), DriverError> {
        Err(DriverError::Fault("test", "disable".into()))
    }
}

/// Counter whose value is set by the test.
#[derive(Clone)]
pub struct ScriptedCounter(Rc<Cell<u32>>);

impl ScriptedCounter {
    pub fn new(initial: u32) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    pub fn set(&self, value: u32) {
        self.0.set(value)
    }
}

impl RotaryCounter for ScriptedCounter {
    fn counter(&mut self) -> u32 {
        self.0.get()
    }
}

/// Line sensor array reporting a pattern set by the test.
#[derive(Clone)]
pub struct ScriptedLineArray {
    times_us: Rc<RefCell<[u32; 8]>>,
}

impl ScriptedLineArray {
    /// Discharge time reported for a dark channel.
    pub const DARK_US: u32 = 4500;

    /// Discharge time reported for a light channel.
    pub const LIGHT_US: u32 = 700;

    pub fn new() -> Self {
        Self {
            times_us: Rc::new(RefCell::new([Self::LIGHT_US; 8])),
        }
    }

    pub fn set_times(&self, times_us: [u32; 8]) {
        *self.times_us.borrow_mut() = times_us;
    }

    /// Set the pattern from 0 (light) and 1 (dark) flags.
    pub fn set_pattern(&self, pattern: [u8; 8]) {
        let mut times = [Self::LIGHT_US; 8];
        for (t, p) in times.iter_mut().zip(pattern.iter()) {
            if *p != 0 {
                *t = Self::DARK_US;
            }
        }
        self.set_times(times);
    }
}

impl LineSensorArray for ScriptedLineArray {
    fn discharge_time_us(&mut self, channel: usize, _timeout_us: u32) -> u32 {
        self.times_us.borrow()[channel]
    }
}

/// Bump switches set by the test.
#[derive(Clone, Default)]
pub struct FakeBumpers(Rc<Cell<[bool; 2]>>);

impl FakeBumpers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, left: bool, right: bool) {
        self.0.set([left, right])
    }
}

impl BumpSwitches for FakeBumpers {
    fn read(&mut self) -> [bool; 2] {
        self.0.get()
    }
}

/// Clock advanced explicitly by the test.
#[derive(Default)]
pub struct ManualClock {
    micros: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn advance_ms(&self, ms: u64) {
        self.micros.set(self.micros.get() + ms * 1000)
    }
}

impl Clock for ManualClock {
    fn ticks_ms(&self) -> u32 {
        (self.micros.get() / 1000) as u32
    }

    fn ticks_us(&self) -> u32 {
        self.micros.get() as u32
    }
}
