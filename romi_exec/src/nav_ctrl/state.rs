//! Implementations for the NavCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use std::{convert::TryFrom, rc::Rc};

// Internal
use super::{NavCtrlError, NavCtrlParams, NavMode, WheelDemand};
use crate::{
    drivers::{BumpSwitches, Clock, LineSensorArray},
    line_sensor::{CentroidSample, LineSensor},
    shares::Shares,
};
use util::{module::Task, time::ticks_diff};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation and behaviour task.
///
/// The only writer of the commanded wheel speeds and the run flag.
pub struct NavCtrl<A, B> {
    params: NavCtrlParams,

    line_sensor: LineSensor<A>,

    bumpers: B,

    clock: Rc<dyn Clock>,

    shares: Shares,

    /// Numeric code of the current mode.
    mode_code: u8,

    /// Set once a bump has been handled, never cleared.
    wall_cleared: bool,

    /// Set once the dash segment has elapsed, never cleared.
    dash_phase_done: bool,

    /// Millisecond tick of the first step.
    mission_start_ms: Option<u32>,

    /// Millisecond tick at which the current mode was entered.
    mode_entry_ms: u32,

    /// Centroid from the previous line following step.
    prev_centroid: f64,

    /// Most recent line sensor sample.
    last_sample: Option<CentroidSample>,

    /// Straight line demand at the current cruise speed, what line following
    /// falls back to.
    base: WheelDemand,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A, B> NavCtrl<A, B>
where
    A: LineSensorArray,
    B: BumpSwitches,
{
    /// Create a new navigation task in `InitSpeed` with the dash cruise speed.
    pub fn new(
        params: NavCtrlParams,
        line_sensor: LineSensor<A>,
        bumpers: B,
        clock: Rc<dyn Clock>,
        shares: &Shares,
    ) -> Self {
        let base = params.geometry.calc_straight(params.dash_speed_ins);

        Self {
            params,
            line_sensor,
            bumpers,
            clock,
            shares: shares.clone(),
            mode_code: NavMode::InitSpeed.into(),
            wall_cleared: false,
            dash_phase_done: false,
            mission_start_ms: None,
            mode_entry_ms: 0,
            prev_centroid: 0.0,
            last_sample: None,
            base,
        }
    }

    /// Get the current mode.
    pub fn mode(&self) -> Result<NavMode, NavCtrlError> {
        NavMode::try_from(self.mode_code)
    }

    /// Force the mode from its numeric code, the code is checked on the next
    /// step.
    pub fn set_mode_code(&mut self, code: u8) {
        self.mode_code = code;
        self.mode_entry_ms = self.clock.ticks_ms();
    }

    pub fn wall_cleared(&self) -> bool {
        self.wall_cleared
    }

    pub fn dash_phase_done(&self) -> bool {
        self.dash_phase_done
    }

    pub fn base_demand(&self) -> WheelDemand {
        self.base
    }

    pub fn last_sample(&self) -> Option<CentroidSample> {
        self.last_sample
    }

    fn put_omegas(&self, omega_left_rads: f64, omega_right_rads: f64) {
        self.shares.omega_dem_left.put(omega_left_rads);
        self.shares.omega_dem_right.put(omega_right_rads);
    }

    /// Publish the cruise speed and start the wheels.
    fn init_speed(&mut self) -> NavMode {
        if self.dash_phase_done {
            self.base = self.params.geometry.calc_straight(self.params.cruise_speed_ins);
        }

        self.shares.duty_left.put(self.base.duty_left_pct);
        self.shares.duty_right.put(self.base.duty_right_pct);
        self.put_omegas(
            self.base.omega_left_rads + self.params.left_trim_rads,
            self.base.omega_right_rads,
        );
        self.shares.run.put(true);

        NavMode::LineFollow
    }

    /// Steer on the line and watch for the dash timeout, finish line and bumps.
    fn line_follow(&mut self, now_ms: u32, start_ms: u32) -> NavMode {
        let mut next = NavMode::LineFollow;

        if !self.dash_phase_done
            && ticks_diff(now_ms, start_ms) >= self.params.dash_duration_ms as i32
        {
            info!("Dash segment complete, slowing to cruise speed");
            self.dash_phase_done = true;
            next = NavMode::InitSpeed;
        }

        let sample = self.line_sensor.sample();
        let centroid = sample.centroid;
        let change = centroid.abs() - self.prev_centroid.abs();
        self.prev_centroid = centroid;
        self.last_sample = Some(sample);

        if change >= 0.0 {
            if centroid == 0.0 {
                // Nothing (or everything) under the array, drive straight
                self.put_omegas(
                    self.base.omega_left_rads + self.params.left_trim_rads,
                    self.base.omega_right_rads,
                );
            } else {
                // Correction builds on the current demand, so a centroid that
                // never changes sign keeps turning harder
                let correction = self.params.steer_gain * centroid;
                self.put_omegas(
                    self.shares.omega_dem_left.get() - correction,
                    self.shares.omega_dem_right.get() + correction,
                );
            }
        } else {
            // Already converging on the line, back off to avoid overshoot
            self.put_omegas(self.base.omega_left_rads, self.base.omega_right_rads);
        }

        trace!(
            "Line follow: centroid {} (change {}), dem L {:.3} R {:.3}",
            centroid,
            change,
            self.shares.omega_dem_left.get(),
            self.shares.omega_dem_right.get()
        );

        if sample.line_detected && self.wall_cleared {
            info!("Finish line reached");
            next = NavMode::FinishSpin;
        }

        if self.bumpers.any_pressed() {
            info!("Bump detected, starting obstacle manoeuvre");
            self.wall_cleared = true;
            next = NavMode::BumpBackup;
        }

        next
    }

    /// Hold a drive demand in `mode` until `duration_ms` has passed since the
    /// mode was entered, then move to `next`.
    fn timed_drive(
        &self,
        mode: NavMode,
        demand: WheelDemand,
        duration_ms: u32,
        next: NavMode,
        now_ms: u32,
    ) -> NavMode {
        self.put_omegas(demand.omega_left_rads, demand.omega_right_rads);

        if ticks_diff(now_ms, self.mode_entry_ms) >= duration_ms as i32 {
            next
        } else {
            mode
        }
    }
}

impl<A, B> Task for NavCtrl<A, B>
where
    A: LineSensorArray,
    B: BumpSwitches,
{
    type Mode = NavMode;
    type StepError = NavCtrlError;

    fn name(&self) -> &str {
        "nav_ctrl"
    }

    fn step(&mut self) -> Result<NavMode, NavCtrlError> {
        let mode = self.mode()?;
        let now_ms = self.clock.ticks_ms();
        let start_ms = *self.mission_start_ms.get_or_insert(now_ms);

        let geom = &self.params.geometry;

        let next = match mode {
            NavMode::InitSpeed => self.init_speed(),
            NavMode::LineFollow => self.line_follow(now_ms, start_ms),
            NavMode::BumpBackup => self.timed_drive(
                mode,
                geom.calc_straight(-self.params.backup_speed_ins),
                self.params.backup_duration_ms,
                NavMode::Pivot,
                now_ms,
            ),
            NavMode::Pivot => self.timed_drive(
                mode,
                geom.calc_spin(self.params.pivot_yaw_rate_rads),
                self.params.pivot_duration_ms,
                NavMode::ArcAroundObstacle,
                now_ms,
            ),
            NavMode::ArcAroundObstacle => self.timed_drive(
                mode,
                geom.calc_arc(
                    self.params.arc_speed_ins,
                    self.params.arc_radius_in,
                    self.params.arc_direction,
                ),
                self.params.arc_duration_ms,
                NavMode::ResumeStraight,
                now_ms,
            ),
            NavMode::ResumeStraight => self.timed_drive(
                mode,
                geom.calc_straight(self.params.resume_speed_ins),
                self.params.resume_duration_ms,
                NavMode::InitSpeed,
                now_ms,
            ),
            NavMode::FinishSpin => self.timed_drive(
                mode,
                geom.calc_spin(self.params.finish_yaw_rate_rads),
                self.params.finish_duration_ms,
                NavMode::InitSpeed,
                now_ms,
            ),
            NavMode::Finished => {
                self.shares.run.put(false);
                self.put_omegas(0.0, 0.0);
                NavMode::Finished
            }
        };

        if next != mode {
            debug!("nav_ctrl: {:?} -> {:?}", mode, next);
            self.mode_entry_ms = now_ms;
        }
        self.mode_code = next.into();

        Ok(next)
    }

    /// Lower the run flag and zero the wheel demands.
    fn shutdown(&mut self) -> Result<(), NavCtrlError> {
        self.shares.run.put(false);
        self.put_omegas(0.0, 0.0);
        self.mode_code = NavMode::Finished.into();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        line_sensor::LineSensorParams,
        test_util::{FakeBumpers, ManualClock, ScriptedLineArray},
    };
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const TICK_MS: u64 = 100;

    struct Fixture {
        nav: NavCtrl<ScriptedLineArray, FakeBumpers>,
        line: ScriptedLineArray,
        bumpers: FakeBumpers,
        clock: Rc<ManualClock>,
        shares: Shares,
        params: NavCtrlParams,
    }

    fn fixture() -> Fixture {
        let shares = Shares::new();
        let line = ScriptedLineArray::new();
        let bumpers = FakeBumpers::new();
        let clock = ManualClock::new();
        let params = NavCtrlParams::default();
        let nav = NavCtrl::new(
            params.clone(),
            LineSensor::new(line.clone(), LineSensorParams::default()),
            bumpers.clone(),
            clock.clone(),
            &shares,
        );

        Fixture {
            nav,
            line,
            bumpers,
            clock,
            shares,
            params,
        }
    }

    impl Fixture {
        fn tick(&mut self) -> NavMode {
            self.clock.advance_ms(TICK_MS);
            self.nav.step().unwrap()
        }

        fn omegas(&self) -> (f64, f64) {
            (
                self.shares.omega_dem_left.get(),
                self.shares.omega_dem_right.get(),
            )
        }

        /// Tick until the mode changes, returning the new mode and the number
        /// of ticks taken.
        fn tick_until_change(&mut self) -> (NavMode, u64) {
            let mode = self.nav.mode().unwrap();
            for n in 1..1000 {
                let m = self.tick();
                if m != mode {
                    return (m, n);
                }
            }
            panic!("{:?} never exited", mode);
        }
    }

    #[test]
    fn test_init_speed_publishes_cruise() {
        let mut f = fixture();

        assert_eq!(f.tick(), NavMode::LineFollow);

        let base = f.params.geometry.calc_straight(6.0);
        assert!(f.shares.run.get());
        assert_relative_eq!(f.shares.duty_left.get(), base.duty_left_pct);
        assert_relative_eq!(f.shares.duty_right.get(), base.duty_right_pct);
        let (l, r) = f.omegas();
        assert_relative_eq!(l, base.omega_left_rads + 1.2);
        assert_relative_eq!(r, base.omega_right_rads);
    }

    #[test]
    fn test_centroid_sequence() {
        let mut f = fixture();
        f.tick();
        let base = f.nav.base_demand();

        // Tick 1, centroid 0: straight with trim
        f.line.set_pattern([0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(f.tick(), NavMode::LineFollow);
        let (l, r) = f.omegas();
        assert_relative_eq!(l, base.omega_left_rads + 1.2);
        assert_relative_eq!(r, base.omega_right_rads);

        // Tick 2, centroid 5: error growing, incremental correction
        f.line.set_pattern([0, 0, 1, 1, 0, 0, 0, 0]);
        f.tick();
        assert_eq!(f.nav.last_sample().unwrap().centroid, 5.0);
        let (l, r) = f.omegas();
        assert_relative_eq!(l, base.omega_left_rads + 1.2 - 0.325, epsilon = 1e-12);
        assert_relative_eq!(r, base.omega_right_rads + 0.325, epsilon = 1e-12);

        // Tick 3, centroid 3: error shrinking, hold the base speeds
        f.line.set_pattern([0, 0, 1, 0, 1, 0, 0, 0]);
        f.tick();
        assert_eq!(f.nav.last_sample().unwrap().centroid, 3.0);
        let (l, r) = f.omegas();
        assert_relative_eq!(l, base.omega_left_rads);
        assert_relative_eq!(r, base.omega_right_rads);

        // Tick 4, centroid 0: still shrinking, so the base speeds again
        f.line.set_pattern([0, 0, 0, 0, 0, 0, 0, 0]);
        f.tick();
        let (l, r) = f.omegas();
        assert_relative_eq!(l, base.omega_left_rads);
        assert_relative_eq!(r, base.omega_right_rads);

        // Tick 5, centroid 0 with no change: trim is back
        f.tick();
        let (l, _) = f.omegas();
        assert_relative_eq!(l, base.omega_left_rads + 1.2);
    }

    #[test]
    fn test_one_sided_error_accumulates() {
        let mut f = fixture();
        f.tick();
        let base = f.nav.base_demand();

        f.line.set_pattern([0, 0, 0, 0, 0, 0, 1, 1]);
        for _ in 0..10 {
            f.tick();
        }

        // -23 centroid applied on every tick with no change in error
        let (l, r) = f.omegas();
        assert_relative_eq!(l, base.omega_left_rads + 1.2 + 10.0 * 0.065 * 23.0, epsilon = 1e-9);
        assert_relative_eq!(r, base.omega_right_rads - 10.0 * 0.065 * 23.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bump_runs_manoeuvre_and_stays_cleared() {
        let mut f = fixture();
        f.tick();
        f.tick();
        assert!(!f.nav.wall_cleared());

        f.bumpers.set(false, true);
        assert_eq!(f.tick(), NavMode::BumpBackup);
        assert!(f.nav.wall_cleared());
        f.bumpers.set(false, false);

        // Reverse
        f.tick();
        let back = f.params.geometry.calc_straight(-3.0);
        assert_eq!(f.omegas(), (back.omega_left_rads, back.omega_right_rads));
        assert!(back.omega_left_rads < 0.0);

        let (mode, n) = f.tick_until_change();
        assert_eq!(mode, NavMode::Pivot);
        assert_eq!(n, 14);

        let spin = f.params.geometry.calc_spin(-PI);
        let (mode, n) = f.tick_until_change();
        assert_eq!(mode, NavMode::ArcAroundObstacle);
        assert_eq!(n, 5);
        assert_eq!(f.omegas(), (spin.omega_left_rads, spin.omega_right_rads));

        let (mode, n) = f.tick_until_change();
        assert_eq!(mode, NavMode::ResumeStraight);
        assert_eq!(n, 75);
        let (l, r) = f.omegas();
        assert!(r > l);

        let (mode, n) = f.tick_until_change();
        assert_eq!(mode, NavMode::InitSpeed);
        assert_eq!(n, 30);

        assert_eq!(f.tick(), NavMode::LineFollow);
        assert!(f.nav.wall_cleared());
        f.tick();
        assert!(f.nav.wall_cleared());
    }

    #[test]
    fn test_finish_line_needs_cleared_wall() {
        let mut f = fixture();
        f.tick();

        f.line.set_pattern([1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(f.tick(), NavMode::LineFollow);

        // Clear the wall then come back to the line
        f.line.set_pattern([0, 0, 0, 0, 0, 0, 0, 0]);
        f.bumpers.set(true, false);
        assert_eq!(f.tick(), NavMode::BumpBackup);
        f.bumpers.set(false, false);
        f.nav.set_mode_code(NavMode::LineFollow.into());

        f.line.set_pattern([1, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(f.tick(), NavMode::FinishSpin);

        let (mode, n) = f.tick_until_change();
        assert_eq!(mode, NavMode::InitSpeed);
        assert_eq!(n, 10);
    }

    #[test]
    fn test_bump_wins_over_finish_line() {
        let mut f = fixture();
        f.tick();
        f.bumpers.set(true, true);
        f.tick();
        f.bumpers.set(false, false);
        f.nav.set_mode_code(NavMode::LineFollow.into());

        f.line.set_pattern([1, 0, 0, 0, 0, 0, 0, 1]);
        f.bumpers.set(true, false);
        assert_eq!(f.tick(), NavMode::BumpBackup);
    }

    #[test]
    fn test_dash_phase_switches_to_cruise() {
        let mut f = fixture();

        // First step starts the mission clock
        f.tick();
        let mut n = 1;
        while f.tick() == NavMode::LineFollow {
            n += 1;
        }
        assert_eq!(n, 150);
        assert!(f.nav.dash_phase_done());
        assert_eq!(f.nav.mode().unwrap(), NavMode::InitSpeed);

        f.tick();
        let cruise = f.params.geometry.calc_straight(3.0);
        assert_eq!(f.nav.base_demand(), cruise);
        let (l, r) = f.omegas();
        assert_relative_eq!(l, cruise.omega_left_rads + 1.2);
        assert_relative_eq!(r, cruise.omega_right_rads);
        assert_relative_eq!(f.shares.duty_left.get(), cruise.duty_left_pct);

        // The dash phase only ends once
        for _ in 0..200 {
            assert_eq!(f.tick(), NavMode::LineFollow);
        }
    }

    #[test]
    fn test_timing_across_clock_wrap() {
        let mut f = fixture();
        f.clock.advance_ms(u32::MAX as u64 - 250);
        f.tick();
        f.bumpers.set(true, false);
        assert_eq!(f.tick(), NavMode::BumpBackup);
        f.bumpers.set(false, false);

        let (mode, n) = f.tick_until_change();
        assert_eq!(mode, NavMode::Pivot);
        assert_eq!(n, 15);
    }

    #[test]
    fn test_finished_stops_wheels() {
        let mut f = fixture();
        f.tick();
        f.tick();
        assert!(f.shares.run.get());

        f.nav.set_mode_code(NavMode::Finished.into());
        assert_eq!(f.tick(), NavMode::Finished);
        assert!(!f.shares.run.get());
        assert_eq!(f.omegas(), (0.0, 0.0));
        assert_eq!(f.tick(), NavMode::Finished);
    }

    #[test]
    fn test_invalid_mode_is_fatal() {
        let mut f = fixture();
        f.nav.set_mode_code(42);
        assert!(matches!(f.nav.step(), Err(NavCtrlError::InvalidMode(42))));
    }

    #[test]
    fn test_shutdown_lowers_run_flag() {
        let mut f = fixture();
        f.tick();
        f.nav.shutdown().unwrap();
        assert!(!f.shares.run.get());
        assert_eq!(f.omegas(), (0.0, 0.0));
        assert_eq!(f.nav.mode().unwrap(), NavMode::Finished);
    }
}
