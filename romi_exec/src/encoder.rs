//! # Encoder integrator
//!
//! Turns the raw value of a wrapping quadrature counter into an unwrapped
//! wheel position and the angular speed over the last sample.
//!
//! The unwrap assumes the counter moves by less than half its range between
//! two calls to [`Encoder::update`]. If the sampling task is starved for longer
//! than that the delta is silently aliased, nothing here can detect it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use crate::drivers::RotaryCounter;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Encoder state for one wheel.
#[derive(Debug)]
pub struct Encoder<C> {
    counter: C,

    /// Counter auto-reload value, the counter counts `0..=auto_reload`.
    auto_reload: u32,

    ticks_per_rev: f64,

    last_raw: u32,

    /// Unwrapped ticks over the last update.
    delta_ticks: i64,

    delta_rad: f64,

    position_ticks: i64,

    position_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<C: RotaryCounter> Encoder<C> {
    /// Create a new encoder, using the current counter value as the
    /// reference for the first delta.
    pub fn new(mut counter: C, auto_reload: u32, ticks_per_rev: f64) -> Self {
        let last_raw = counter.counter();

        Self {
            counter,
            auto_reload,
            ticks_per_rev,
            last_raw,
            delta_ticks: 0,
            delta_rad: 0.0,
            position_ticks: 0,
            position_rad: 0.0,
        }
    }

    /// Sample the counter and integrate the movement since the last sample.
    pub fn update(&mut self) {
        let raw = self.counter.counter();

        self.delta_ticks = unwrap_delta(raw as i64 - self.last_raw as i64, self.auto_reload);
        self.last_raw = raw;

        self.delta_rad = std::f64::consts::TAU * self.delta_ticks as f64 / self.ticks_per_rev;
        self.position_ticks += self.delta_ticks;
        self.position_rad += self.delta_rad;

        trace!(
            "Encoder raw {} delta {} pos {}",
            raw,
            self.delta_ticks,
            self.position_ticks
        );
    }

    /// Reset the accumulated position.
    ///
    /// The counter reference is kept so the next delta is still correct.
    pub fn zero(&mut self) {
        self.position_ticks = 0;
        self.position_rad = 0.0;
    }

    pub fn get_position(&self) -> i64 {
        self.position_ticks
    }

    /// Units: radians
    pub fn get_position_rad(&self) -> f64 {
        self.position_rad
    }

    pub fn get_delta(&self) -> i64 {
        self.delta_ticks
    }

    /// Angular speed over the last update, given the time it spanned.
    ///
    /// Only the last update is used, call [`Encoder::update`] right before.
    /// A non-positive interval gives zero speed.
    ///
    /// Units: radians/second
    pub fn get_speed(&self, interval_s: f64) -> f64 {
        if interval_s > 0.0 {
            self.delta_rad / interval_s
        } else {
            0.0
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Correct a raw counter difference for one wraparound of a counter with the
/// given auto-reload value.
///
/// The result lies in `[-(auto_reload + 1) / 2, (auto_reload + 1) / 2]`.
pub fn unwrap_delta(delta: i64, auto_reload: u32) -> i64 {
    let modulus = auto_reload as i64 + 1;

    // Compare against twice the delta so odd moduli split exactly in half
    if 2 * delta < -modulus {
        delta + modulus
    } else if 2 * delta > modulus {
        delta - modulus
    } else {
        delta
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
