//! # Hardware capability contracts
//!
//! The control tasks never touch registers directly. Each piece of hardware is
//! reached through one of the traits in this module, implemented by a thin
//! driver on the target or by the simulated hardware on a host.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::rc::Rc;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors reported by a hardware driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Hardware fault on the {0} channel: {1}")]
    Fault(&'static str, String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// One channel of the motor driver.
///
/// All calls must be idempotent, re-issuing the same duty or enable is safe.
pub trait MotorDriver {
    /// Set the signed duty cycle in percent.
    ///
    /// The sign selects the direction output, the magnitude is saturated at
    /// 100 by the driver.
    fn set_duty(&mut self, duty_pct: f64) -> Result<(), DriverError>;

    /// Enable the channel.
    fn enable(&mut self) -> Result<(), DriverError>;

    /// Disable the channel.
    fn disable(&mut self) -> Result<(), DriverError>;
}

/// A free running quadrature counter.
pub trait RotaryCounter {
    /// Read the raw counter value, in `0..=auto_reload`.
    fn counter(&mut self) -> u32;
}

/// The reflectance sensor array, addressed positionally from the robot's left
/// (channel 0) to its right.
pub trait LineSensorArray {
    /// Charge the channel's capacitor and time its discharge.
    ///
    /// The read gives up after `timeout_us`, in which case a value of at least
    /// `timeout_us` is returned.
    fn discharge_time_us(&mut self, channel: usize, timeout_us: u32) -> u32;
}

/// The two front bump switches, active high on contact.
pub trait BumpSwitches {
    /// Read the `[left, right]` switch states.
    fn read(&mut self) -> [bool; 2];

    /// True if either switch is pressed.
    fn any_pressed(&mut self) -> bool {
        let [left, right] = self.read();
        left || right
    }
}

/// A free running monotonic clock.
///
/// Both counters wrap around, use `util::time::ticks_diff` for intervals.
pub trait Clock {
    /// Milliseconds tick counter.
    fn ticks_ms(&self) -> u32;

    /// Microseconds tick counter.
    fn ticks_us(&self) -> u32;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: MotorDriver + ?Sized> MotorDriver for Box<T> {
    fn set_duty(&mut self, duty_pct: f64) -> Result<(), DriverError> {
        (**self).set_duty(duty_pct)
    }

    fn enable(&mut self) -> Result<(), DriverError> {
        (**self).enable()
    }

    fn disable(&mut self) -> Result<(), DriverError> {
        (**self).disable()
    }
}

impl<T: RotaryCounter + ?Sized> RotaryCounter for Box<T> {
    fn counter(&mut self) -> u32 {
        (**self).counter()
    }
}

impl<T: LineSensorArray + ?Sized> LineSensorArray for Box<T> {
    fn discharge_time_us(&mut self, channel: usize, timeout_us: u32) -> u32 {
        (**self).discharge_time_us(channel, timeout_us)
    }
}

impl<T: BumpSwitches + ?Sized> BumpSwitches for Box<T> {
    fn read(&mut self) -> [bool; 2] {
        (**self).read()
    }
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn ticks_ms(&self) -> u32 {
        (**self).ticks_ms()
    }

    fn ticks_us(&self) -> u32 {
        (**self).ticks_us()
    }
}
