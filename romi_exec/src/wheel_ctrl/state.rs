//! Implementations for the WheelCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use std::{convert::TryFrom, rc::Rc};

// Internal
use super::{calc_duty, Side, WheelCtrlError, WheelCtrlParams, WheelMode};
use crate::{
    drivers::{Clock, MotorDriver, RotaryCounter},
    encoder::Encoder,
    shares::{Share, Shares},
};
use util::{
    module::Task,
    time::{ticks_diff, MICROS_PER_SECOND},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity controller for one wheel.
///
/// Owns the wheel's motor driver channel and encoder. The controller only
/// drives the motor while the shared run flag is set.
pub struct WheelCtrl<M, C> {
    name: String,

    params: WheelCtrlParams,

    motor: M,

    encoder: Encoder<C>,

    clock: Rc<dyn Clock>,

    duty: Share<f64>,

    omega_dem: Share<f64>,

    run: Share<bool>,

    /// Numeric code of the current mode.
    mode_code: u8,

    /// Microsecond tick of the previous control sample.
    last_sample_us: u32,

    /// Last duty sent to the motor.
    ///
    /// Units: percent
    commanded_duty: f64,

    /// Speed measured on the last Running step.
    ///
    /// Units: radians/second
    omega_meas: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M, C> WheelCtrl<M, C>
where
    M: MotorDriver,
    C: RotaryCounter,
{
    /// Create a new controller in `Init`, bound to its side's shares.
    pub fn new(
        side: Side,
        params: WheelCtrlParams,
        motor: M,
        counter: C,
        clock: Rc<dyn Clock>,
        shares: &Shares,
    ) -> Self {
        let (duty, omega_dem) = match side {
            Side::Left => (shares.duty_left.clone(), shares.omega_dem_left.clone()),
            Side::Right => (shares.duty_right.clone(), shares.omega_dem_right.clone()),
        };

        let encoder = Encoder::new(counter, params.counter_auto_reload, params.ticks_per_rev);
        let last_sample_us = clock.ticks_us();

        Self {
            name: format!("wheel_ctrl_{}", side),
            params,
            motor,
            encoder,
            clock,
            duty,
            omega_dem,
            run: shares.run.clone(),
            mode_code: WheelMode::Init.into(),
            last_sample_us,
            commanded_duty: 0.0,
            omega_meas: 0.0,
        }
    }

    /// Get the current mode.
    pub fn mode(&self) -> Result<WheelMode, WheelCtrlError> {
        WheelMode::try_from(self.mode_code)
    }

    /// Force the mode from its numeric code, the code is checked on the next
    /// step.
    pub fn set_mode_code(&mut self, code: u8) {
        self.mode_code = code;
    }

    pub fn encoder(&self) -> &Encoder<C> {
        &self.encoder
    }

    /// Units: percent
    pub fn commanded_duty(&self) -> f64 {
        self.commanded_duty
    }

    /// Units: radians/second
    pub fn measured_speed(&self) -> f64 {
        self.omega_meas
    }

    fn transition(&mut self, from: WheelMode, to: WheelMode) {
        if from != to {
            debug!("{}: {:?} -> {:?}", self.name, from, to);
        }
        self.mode_code = to.into();
    }

    /// Run one closed loop control sample.
    fn control(&mut self) -> Result<(), WheelCtrlError> {
        let before = self.last_sample_us;
        let now = self.clock.ticks_us();
        self.last_sample_us = now;
        let dt_s = ticks_diff(now, before) as f64 / MICROS_PER_SECOND;

        self.encoder.update();
        let omega_dem = self.omega_dem.get();
        self.omega_meas = self.encoder.get_speed(dt_s);

        let duty = calc_duty(&self.params, omega_dem, self.omega_meas);

        trace!(
            "{}: dt {:.6} s, dem {:.3} rad/s, meas {:.3} rad/s, duty {:.2} %",
            self.name,
            dt_s,
            omega_dem,
            self.omega_meas,
            duty
        );

        self.duty.put(duty);
        self.commanded_duty = duty;
        self.motor.set_duty(duty)?;

        Ok(())
    }
}

impl<M, C> Task for WheelCtrl<M, C>
where
    M: MotorDriver,
    C: RotaryCounter,
{
    type Mode = WheelMode;
    type StepError = WheelCtrlError;

    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self) -> Result<WheelMode, WheelCtrlError> {
        let mode = self.mode()?;

        let next = match mode {
            WheelMode::Init => {
                self.encoder.zero();

                if self.run.get() {
                    WheelMode::Starting
                } else {
                    WheelMode::Init
                }
            }
            WheelMode::Starting => {
                // Bootstrap from the shared duty, closed loop starts next step
                self.last_sample_us = self.clock.ticks_us();
                self.commanded_duty = self.duty.get();
                self.motor.set_duty(self.commanded_duty)?;
                self.motor.enable()?;

                WheelMode::Running
            }
            WheelMode::Running => {
                self.control()?;

                if self.run.get() {
                    WheelMode::Running
                } else {
                    WheelMode::Stopping
                }
            }
            WheelMode::Stopping => {
                self.motor.disable()?;

                WheelMode::Idle
            }
            WheelMode::Idle => {
                if self.run.get() {
                    WheelMode::Starting
                } else {
                    WheelMode::Idle
                }
            }
        };

        self.transition(mode, next);

        Ok(next)
    }

    /// Disable the motor regardless of mode.
    fn shutdown(&mut self) -> Result<(), WheelCtrlError> {
        debug!("{}: disabling motor", self.name);
        self.motor.disable()?;
        self.mode_code = WheelMode::Idle.into();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
