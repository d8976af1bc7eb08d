//! Whole robot tests, running every task against the simulated hardware.

#![cfg(feature = "sim")]

use romi_lib::{
    mission::{StopReason, Termination},
    nav_ctrl::NavMode,
    robot::{Robot, RobotParams},
    sim::{Pose, Sim, SimParams},
    wheel_ctrl::{Side, WheelMode},
};

struct Mission {
    robot: Robot,
    sim: Sim,

    /// Each navigation mode entered, with the pose on entry.
    nav_log: Vec<(NavMode, Pose)>,
}

impl Mission {
    fn new(sim_params: SimParams) -> Self {
        let params = RobotParams::default();
        let sim = Sim::new(sim_params, &params);
        let robot = Robot::new(params, sim.hardware());

        Self {
            robot,
            sim,
            nav_log: Vec::new(),
        }
    }

    fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.cycle();
            self.sim.advance_ms(1);
        }
    }

    /// Run the host loop until a stop condition holds, giving up after
    /// `max_ms`.
    fn run_until(&mut self, term: &Termination, max_ms: u32) -> Option<StopReason> {
        for _ in 0..max_ms {
            self.cycle();
            if let Some(reason) = term.check(&self.robot) {
                return Some(reason);
            }
            self.sim.advance_ms(1);
        }
        None
    }

    fn cycle(&mut self) {
        self.robot.run_once().unwrap();

        if let Some(m) = self.robot.nav_mode() {
            if self.nav_log.last().map(|(l, _)| *l) != Some(m) {
                self.nav_log.push((m, self.sim.pose()));
            }
        }
    }

    fn position(&self, mode: NavMode) -> Option<usize> {
        self.nav_log.iter().position(|(m, _)| *m == mode)
    }

    fn entered(&self, mode: NavMode) -> Option<Pose> {
        self.nav_log
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, p)| *p)
    }
}

#[test]
fn test_follows_line_forward() {
    let mut m = Mission::new(SimParams::default());
    m.run_ms(3000);

    assert_eq!(m.robot.wheel_mode(Side::Left), Some(WheelMode::Running));
    assert_eq!(m.robot.wheel_mode(Side::Right), Some(WheelMode::Running));
    assert_eq!(m.robot.nav_mode(), Some(NavMode::LineFollow));
    assert!(m.robot.shares().run.get());

    let pose = m.sim.pose();
    assert!(pose.x_in > 10.0, "x = {}", pose.x_in);
    assert!(pose.y_in.abs() < 3.0, "y = {}", pose.y_in);

    let summary = m.robot.summary();
    assert_eq!(summary.elapsed_ms, 3000);
    assert_eq!(summary.tasks.len(), 3);
    assert_eq!(summary.tasks[2].runs, 30);
}

#[test]
fn test_bump_runs_manoeuvre_sequence() {
    let mut m = Mission::new(SimParams {
        obstacle_x_in: 15.0,
        ..Default::default()
    });
    m.run_ms(12_000);

    let bump = m.entered(NavMode::BumpBackup).expect("never bumped");
    let pivot = m.entered(NavMode::Pivot).expect("never pivoted");
    assert!(m.entered(NavMode::ArcAroundObstacle).is_some());
    assert!(m.entered(NavMode::ResumeStraight).is_some());

    // Backed away from the obstacle before pivoting
    assert!(pivot.x_in < bump.x_in - 2.0);

    // Clockwise pivot
    let arc = m.entered(NavMode::ArcAroundObstacle).unwrap();
    assert!(arc.heading_rad < pivot.heading_rad);

    let order: Vec<NavMode> = m.nav_log.iter().map(|(m, _)| *m).collect();
    let start = order
        .iter()
        .position(|m| *m == NavMode::BumpBackup)
        .unwrap();
    assert_eq!(
        &order[start..start + 4],
        &[
            NavMode::BumpBackup,
            NavMode::Pivot,
            NavMode::ArcAroundObstacle,
            NavMode::ResumeStraight
        ]
    );
}

#[test]
fn test_finish_line_ignored_before_obstacle() {
    let mut m = Mission::new(SimParams {
        finish_line_x_in: 8.0,
        ..Default::default()
    });
    m.run_ms(4000);

    assert!(m.sim.pose().x_in > 8.0);
    assert!(m.entered(NavMode::FinishSpin).is_none());
}

#[test]
fn test_shutdown_stops_motors() {
    let mut m = Mission::new(SimParams::default());
    m.run_ms(1000);
    assert!(m.sim.motor_enabled(Side::Left));

    m.robot.shutdown().unwrap();

    assert!(!m.sim.motor_enabled(Side::Left));
    assert!(!m.sim.motor_enabled(Side::Right));
    assert!(!m.robot.shares().run.get());

    // The wheels spin down once disabled
    m.sim.advance_ms(500);
    assert!(m.sim.wheel_speed(Side::Left).abs() < 0.01);
}

#[test]
fn test_default_course_reaches_finish() {
    let params = SimParams::default();
    let mut m = Mission::new(params.clone());
    m.run_ms(50_000);

    let bump = m.position(NavMode::BumpBackup).expect("never bumped");
    let finish = m.position(NavMode::FinishSpin).expect("never reached the finish");

    // Only a handled bump arms the finish line
    assert!(bump < finish);
    assert!(m.position(NavMode::ResumeStraight).unwrap() < finish);
    assert_eq!(
        m.nav_log[..finish]
            .iter()
            .filter(|(mode, _)| *mode == NavMode::BumpBackup)
            .count(),
        1
    );

    // Picked up the shifted line and followed it, not a crossing of it
    let spin = m.entered(NavMode::FinishSpin).unwrap();
    assert!(
        spin.x_in > params.finish_line_x_in - params.sensor_offset_in - 1.0,
        "spun at x = {}",
        spin.x_in
    );
    assert!(spin.x_in < params.finish_line_x_in);
    assert!((spin.y_in + params.line_jog_in).abs() < 1.0, "y = {}", spin.y_in);
    assert!(spin.heading_rad.abs() < 0.5);
}

#[test]
fn test_interrupt_ends_in_shutdown() {
    let mut m = Mission::new(SimParams::default());
    let term = Termination::new(0);

    // No duration limit, so only the interrupt ends the run
    assert_eq!(m.run_until(&term, 2000), None);
    assert!(m.sim.motor_enabled(Side::Left));

    term.interrupt_flag()
        .store(true, std::sync::atomic::Ordering::SeqCst);
    assert_eq!(m.run_until(&term, 10), Some(StopReason::Interrupted));

    m.robot.shutdown().unwrap();
    assert!(!m.sim.motor_enabled(Side::Left));
    assert!(!m.sim.motor_enabled(Side::Right));
    assert!(!m.robot.shares().run.get());
    assert_eq!(m.robot.summary().elapsed_ms, 2000);
}
