//! # Inter-task shared cells
//!
//! Tasks never share state through globals. Each signal is a named [`Share`]
//! created once and cloned into every task that reads or writes it. Tasks run
//! cooperatively on one thread, so a `put` is always seen whole by the next
//! `get` of any other task.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::Cell, fmt, rc::Rc};

use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A named single value cell shared between tasks.
///
/// Cloning the share clones the handle, not the value.
#[derive(Clone)]
pub struct Share<T: Copy> {
    name: &'static str,
    value: Rc<Cell<T>>,
}

/// All the signals exchanged between the navigation task and the wheel
/// controllers.
#[derive(Clone)]
pub struct Shares {
    /// Left wheel duty, bootstrap value from navigation then written by the
    /// left controller.
    pub duty_left: Share<f64>,

    /// Right wheel duty, see `duty_left`.
    pub duty_right: Share<f64>,

    /// Commanded left wheel angular speed.
    ///
    /// Units: radians/second
    pub omega_dem_left: Share<f64>,

    /// Commanded right wheel angular speed.
    ///
    /// Units: radians/second
    pub omega_dem_right: Share<f64>,

    /// Set by navigation to put the wheel controllers into their drive modes.
    pub run: Share<bool>,
}

/// Point in time copy of all shares, for the end of run summary.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct SharesSnapshot {
    pub duty_left: f64,
    pub duty_right: f64,
    pub omega_dem_left: f64,
    pub omega_dem_right: f64,
    pub run: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: Copy> Share<T> {
    /// Create a new share with an initial value.
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            value: Rc::new(Cell::new(initial)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn put(&self, value: T) {
        self.value.set(value)
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Share<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("name", &self.name)
            .field("value", &self.get())
            .finish()
    }
}

impl<T: Copy + fmt::Display> fmt::Display for Share<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16} {}", self.name, self.get())
    }
}

impl Shares {
    /// Create the full set of shares, all zeroed with `run` cleared.
    pub fn new() -> Self {
        Self {
            duty_left: Share::new("dutyLeft", 0.0),
            duty_right: Share::new("dutyRight", 0.0),
            omega_dem_left: Share::new("commandedOmegaLeft", 0.0),
            omega_dem_right: Share::new("commandedOmegaRight", 0.0),
            run: Share::new("runFlag", false),
        }
    }

    pub fn snapshot(&self) -> SharesSnapshot {
        SharesSnapshot {
            duty_left: self.duty_left.get(),
            duty_right: self.duty_right.get(),
            omega_dem_left: self.omega_dem_left.get(),
            omega_dem_right: self.omega_dem_right.get(),
            run: self.run.get(),
        }
    }
}

impl Default for Shares {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.duty_left)?;
        writeln!(f, "{}", self.duty_right)?;
        writeln!(f, "{}", self.omega_dem_left)?;
        writeln!(f, "{}", self.omega_dem_right)?;
        write!(f, "{}", self.run)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
