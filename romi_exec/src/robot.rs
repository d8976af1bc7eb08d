//! # Robot assembly
//!
//! Builds the shares, the four tasks and the scheduler from a set of drivers
//! and parameters, and owns them for the whole mission run.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;
use std::{convert::TryFrom, rc::Rc};

use crate::{
    drivers::{BumpSwitches, Clock, LineSensorArray, MotorDriver, RotaryCounter},
    line_sensor::{LineSensor, LineSensorParams},
    nav_ctrl::{NavCtrl, NavCtrlParams, NavMode},
    params::RomiExecParams,
    sched::{SchedError, Scheduler, TaskStats},
    shares::{Shares, SharesSnapshot},
    wheel_ctrl::{Side, WheelCtrl, WheelCtrlParams, WheelMode},
};
use util::time::ticks_diff;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The drivers for every piece of hardware the tasks use.
pub struct Hardware {
    pub motor_left: Box<dyn MotorDriver>,
    pub motor_right: Box<dyn MotorDriver>,
    pub counter_left: Box<dyn RotaryCounter>,
    pub counter_right: Box<dyn RotaryCounter>,
    pub line_array: Box<dyn LineSensorArray>,
    pub bumpers: Box<dyn BumpSwitches>,
    pub clock: Rc<dyn Clock>,
}

/// Parameters of every task, each loaded from its own file.
#[derive(Debug, Clone, Default)]
pub struct RobotParams {
    pub exec: RomiExecParams,
    pub wheel_ctrl: WheelCtrlParams,
    pub line_sensor: LineSensorParams,
    pub nav_ctrl: NavCtrlParams,
}

pub struct Robot {
    sched: Scheduler,
    shares: Shares,
    clock: Rc<dyn Clock>,
    start_ms: u32,
    cycles: u64,
}

/// End of run record, saved into the session directory.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Units: milliseconds
    pub elapsed_ms: i32,

    /// Number of calls to `Robot::run_once`.
    pub cycles: u64,

    pub tasks: Vec<TaskStats>,

    pub shares: SharesSnapshot,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Robot {
    /// Build all tasks and register them, wheel controllers first.
    pub fn new(params: RobotParams, hw: Hardware) -> Self {
        let shares = Shares::new();
        let exec = &params.exec;

        let left = WheelCtrl::new(
            Side::Left,
            params.wheel_ctrl.clone(),
            hw.motor_left,
            hw.counter_left,
            hw.clock.clone(),
            &shares,
        );
        let right = WheelCtrl::new(
            Side::Right,
            params.wheel_ctrl.clone(),
            hw.motor_right,
            hw.counter_right,
            hw.clock.clone(),
            &shares,
        );
        let nav = NavCtrl::new(
            params.nav_ctrl.clone(),
            LineSensor::new(hw.line_array, params.line_sensor.clone()),
            hw.bumpers,
            hw.clock.clone(),
            &shares,
        );

        let mut sched = Scheduler::new();
        sched.add(left, exec.wheel_ctrl_priority, exec.wheel_ctrl_period_ms);
        sched.add(right, exec.wheel_ctrl_priority, exec.wheel_ctrl_period_ms);
        sched.add(nav, exec.nav_ctrl_priority, exec.nav_ctrl_period_ms);

        let start_ms = hw.clock.ticks_ms();

        Self {
            sched,
            shares,
            clock: hw.clock,
            start_ms,
            cycles: 0,
        }
    }

    /// Run every task that is due now.
    pub fn run_once(&mut self) -> Result<usize, SchedError> {
        self.cycles += 1;
        self.sched.run_once(self.clock.ticks_ms())
    }

    /// Put the robot into a safe state.
    ///
    /// Tasks are shut down in registration order so both motors are disabled
    /// before navigation is stopped. The task and share tables are logged
    /// afterwards, even if a shutdown failed.
    pub fn shutdown(&mut self) -> Result<(), SchedError> {
        let result = self.sched.shutdown();
        if result.is_err() {
            warn!("Robot shutdown incomplete");
        }

        info!("Task table:\n{}", self.sched);
        info!("Shares:\n{}", self.shares);

        result
    }

    pub fn shares(&self) -> &Shares {
        &self.shares
    }

    /// Milliseconds since the robot was built.
    pub fn elapsed_ms(&self) -> i32 {
        ticks_diff(self.clock.ticks_ms(), self.start_ms)
    }

    /// Mode of the navigation task after its last step.
    pub fn nav_mode(&self) -> Option<NavMode> {
        self.task_mode("nav_ctrl")
            .and_then(|c| NavMode::try_from(c).ok())
    }

    /// Mode of a wheel controller after its last step.
    pub fn wheel_mode(&self, side: Side) -> Option<WheelMode> {
        self.task_mode(&format!("wheel_ctrl_{}", side))
            .and_then(|c| WheelMode::try_from(c).ok())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            elapsed_ms: self.elapsed_ms(),
            cycles: self.cycles,
            tasks: self.sched.stats(),
            shares: self.shares.snapshot(),
        }
    }

    fn task_mode(&self, name: &str) -> Option<u8> {
        self.sched
            .stats()
            .into_iter()
            .find(|s| s.name == name)
            .and_then(|s| s.last_mode)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{
        FakeBumpers, ManualClock, MotorCall, RecordingMotor, ScriptedCounter, ScriptedLineArray,
    };

    struct Rig {
        robot: Robot,
        left: RecordingMotor,
        right: RecordingMotor,
        bumpers: FakeBumpers,
        clock: Rc<ManualClock>,
    }

    fn rig() -> Rig {
        let left = RecordingMotor::new();
        let right = RecordingMotor::new();
        let bumpers = FakeBumpers::new();
        let clock = ManualClock::new();

        let hw = Hardware {
            motor_left: Box::new(left.clone()),
            motor_right: Box::new(right.clone()),
            counter_left: Box::new(ScriptedCounter::new(0)),
            counter_right: Box::new(ScriptedCounter::new(0)),
            line_array: Box::new(ScriptedLineArray::new()),
            bumpers: Box::new(bumpers.clone()),
            clock: clock.clone(),
        };

        Rig {
            robot: Robot::new(RobotParams::default(), hw),
            left,
            right,
            bumpers,
            clock,
        }
    }

    impl Rig {
        fn run_ms(&mut self, ms: u64) {
            for _ in 0..ms {
                self.robot.run_once().unwrap();
                self.clock.advance_ms(1);
            }
        }
    }

    #[test]
    fn test_startup_sequence() {
        let mut r = rig();

        // Wheels step before navigation raises the run flag
        r.robot.run_once().unwrap();
        assert_eq!(r.robot.wheel_mode(Side::Left), Some(WheelMode::Init));
        assert_eq!(r.robot.nav_mode(), Some(NavMode::LineFollow));
        assert!(r.robot.shares().run.get());

        r.clock.advance_ms(1);
        r.run_ms(100);
        assert_eq!(r.robot.wheel_mode(Side::Left), Some(WheelMode::Running));
        assert_eq!(r.robot.wheel_mode(Side::Right), Some(WheelMode::Running));
        assert_eq!(r.left.count(MotorCall::Enable), 1);
        assert_eq!(r.right.count(MotorCall::Enable), 1);

        let stats = r.robot.summary().tasks;
        assert_eq!(stats[0].runs, 6);
        assert_eq!(stats[2].runs, 2);
    }

    #[test]
    fn test_bump_starts_manoeuvre() {
        let mut r = rig();
        r.run_ms(500);

        r.bumpers.set(true, false);
        r.run_ms(100);
        assert_eq!(r.robot.nav_mode(), Some(NavMode::BumpBackup));
    }

    #[test]
    fn test_shutdown_disables_motors() {
        let mut r = rig();
        r.run_ms(200);

        r.left.clear();
        r.right.clear();
        r.robot.shutdown().unwrap();

        assert_eq!(r.left.calls(), vec![MotorCall::Disable]);
        assert_eq!(r.right.calls(), vec![MotorCall::Disable]);
        assert!(!r.robot.shares().run.get());
        assert_eq!(r.robot.shares().omega_dem_left.get(), 0.0);
    }

    #[test]
    fn test_param_files_match_defaults() {
        let exec: RomiExecParams =
            util::params::from_str(include_str!("../../params/romi_exec.toml")).unwrap();
        let wheel: WheelCtrlParams =
            util::params::from_str(include_str!("../../params/wheel_ctrl.toml")).unwrap();
        let line: LineSensorParams =
            util::params::from_str(include_str!("../../params/line_sensor.toml")).unwrap();
        let nav: NavCtrlParams =
            util::params::from_str(include_str!("../../params/nav_ctrl.toml")).unwrap();

        let defaults = RobotParams::default();
        assert_eq!(exec.nav_ctrl_period_ms, defaults.exec.nav_ctrl_period_ms);
        assert_eq!(wheel.k_ff, defaults.wheel_ctrl.k_ff);
        assert_eq!(line.dark_threshold_us, defaults.line_sensor.dark_threshold_us);
        assert_eq!(nav.dash_duration_ms, defaults.nav_ctrl.dash_duration_ms);
        assert_eq!(nav.geometry.wheel_radius_in, defaults.nav_ctrl.geometry.wheel_radius_in);
        assert_eq!(nav.arc_direction, defaults.nav_ctrl.arc_direction);
    }
}
